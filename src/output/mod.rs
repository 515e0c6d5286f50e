use anyhow::Result;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::fmt::Display;
use std::io;
use std::path::Path;

/// Turn an operation failure into the string returned across a boundary.
///
/// `verb` describes what was being attempted, e.g. `"fetching transcript"`.
pub fn describe_failure(verb: &str, error: &dyn Display) -> String {
    format!("Error {}: {}", verb, error)
}

/// Message returned by the search tools when nothing matched
pub fn no_matches_message(search_term: &str) -> String {
    format!("No matches found for '{}'", search_term)
}

/// Pretty-print a value as JSON with 2-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Single-line JSON with `", "` and `": "` separators and non-ASCII escaped
/// as `\uXXXX`, the layout YouTube transcript JSON is conventionally emitted in
pub fn to_inline_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, InlineFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(serde::ser::Error::custom)
}

struct InlineFormatter;

impl Formatter for InlineFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Save a rendered result to file
pub async fn save_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a rendered result to stdout
pub fn print_to_console(content: &str) {
    println!("{}", content);
}

/// Write to `path` when given, stdout otherwise
pub async fn emit(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            save_to_file(content, path).await?;
            eprintln!("Result saved to: {}", path.display());
        }
        None => print_to_console(content),
    }
    Ok(())
}
