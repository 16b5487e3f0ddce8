use clap::{Parser, Subcommand};

/// Top-level command
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
  /// Catalog brands
  Brands {
    #[command(subcommand)]
    action: NamedAction,
  },
  /// Catalog types
  Types {
    #[command(subcommand)]
    action: NamedAction,
  },
  /// Catalog items
  Items {
    #[command(subcommand)]
    action: ItemAction,
  },
  /// Read commands from stdin, one per line, against a single session
  Shell,
}

/// Verbs for entities that only carry a name
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NamedAction {
  List,
  Get { id: i32 },
  Create { name: String },
  Update { id: i32, name: String },
  Delete { id: i32 },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ItemAction {
  List {
    /// Include brand and type names
    #[arg(long)]
    detailed: bool,
  },
  Get {
    id: i32,
  },
  Create {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    /// Brand id
    #[arg(long)]
    brand: i32,
    /// Type id
    #[arg(long = "type")]
    type_id: i32,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    picture_uri: Option<String>,
  },
  /// Change the given fields of an existing item
  Update {
    id: i32,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    brand: Option<i32>,
    #[arg(long = "type")]
    type_id: Option<i32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    picture_uri: Option<String>,
  },
  Delete {
    id: i32,
  },
}

/// One line typed into the shell
#[derive(Parser, Debug)]
#[command(name = "", no_binary_name = true)]
struct ShellLine {
  #[command(subcommand)]
  command: Command,
}

/// Parse a shell line. Blank lines parse to `None`.
pub fn parse_shell_line(line: &str) -> Result<Option<Command>, String> {
  let words = split_words(line)?;
  if words.is_empty() {
    return Ok(None);
  }

  ShellLine::try_parse_from(words)
    .map(|parsed| Some(parsed.command))
    .map_err(|e| e.render().to_string())
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, String> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quoted = false;

  for c in line.chars() {
    match c {
      '"' => {
        quoted = !quoted;
        in_word = true;
      }
      c if c.is_whitespace() && !quoted => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      c => {
        current.push(c);
        in_word = true;
      }
    }
  }

  if quoted {
    return Err("Unterminated quote".to_string());
  }
  if in_word {
    words.push(current);
  }

  Ok(words)
}
