//! Interactive command parsing

use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  r            refresh from the server
  u <file>     validate and upload a CSV file
  h            show upload history
  p            write a PDF of the displayed data
  d            download the server's PDF report
  q            quit
  help         show this list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Upload(PathBuf),
    History,
    LocalReport,
    DownloadReport,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Err` carries a message for the user
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "r" | "refresh" => Ok(Command::Refresh),
            "u" | "upload" => {
                if rest.is_empty() {
                    Err("Usage: u <file.csv>".to_string())
                } else {
                    Ok(Command::Upload(PathBuf::from(rest)))
                }
            }
            "h" | "history" => Ok(Command::History),
            "p" | "pdf" => Ok(Command::LocalReport),
            "d" | "download" => Ok(Command::DownloadReport),
            "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("r"), Ok(Command::Refresh));
        assert_eq!(Command::parse("  history "), Ok(Command::History));
        assert_eq!(Command::parse("p"), Ok(Command::LocalReport));
        assert_eq!(Command::parse("d"), Ok(Command::DownloadReport));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
        assert_eq!(Command::parse("help"), Ok(Command::Help));
    }

    #[test]
    fn test_parse_upload_path_with_spaces() {
        assert_eq!(
            Command::parse("u data/plant readings.csv"),
            Ok(Command::Upload(PathBuf::from("data/plant readings.csv")))
        );
        assert!(Command::parse("u").is_err());
    }

    #[test]
    fn test_unknown_and_blank() {
        assert!(Command::parse("launch").unwrap_err().contains("Unknown command"));
        assert_eq!(Command::parse("   "), Err(String::new()));
    }
}
