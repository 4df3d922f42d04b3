use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use tabsplit_core::ParticipantRegistry;

#[derive(Parser, Debug)]
#[command(author, version, about = "Split a receipt between people", long_about = None)]
pub struct Cli {
    /// Receipt image, or a text file when --text is given
    pub receipt: PathBuf,

    /// Treat the receipt file as already-recognized text
    #[arg(long)]
    pub text: bool,

    /// Participant name, in order (repeatable)
    #[arg(short, long = "person", value_name = "NAME")]
    pub people: Vec<String>,

    /// Share an item: ITEM=WHO[,WHO...], 1-based item number; WHO is a name or 1-based number
    #[arg(short, long = "assign", value_name = "ITEM=WHO,..")]
    pub assignments: Vec<AssignSpec>,

    /// Split every item among all named participants before applying --assign
    #[arg(long)]
    pub auto_split: bool,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the session and totals as JSON
    #[arg(long)]
    pub json: bool,

    /// Tesseract tessdata directory
    #[cfg(feature = "tesseract")]
    #[arg(long)]
    pub tessdata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Who {
    /// 0-based participant index.
    Index(usize),
    Name(String),
}

impl Who {
    pub fn resolve(&self, people: &ParticipantRegistry) -> Option<usize> {
        match self {
            Who::Index(i) => (*i < people.len()).then_some(*i),
            Who::Name(name) => people.names().position(|n| n.eq_ignore_ascii_case(name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignSpec {
    /// 0-based item index.
    pub item: usize,
    pub who: Vec<Who>,
}

impl FromStr for AssignSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (item, who) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ITEM=WHO,.. but got '{s}'"))?;
        let item = one_based(item.trim()).ok_or_else(|| format!("invalid item number '{item}'"))?;
        let who = who
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(|w| match one_based(w) {
                Some(i) => Who::Index(i),
                None => Who::Name(w.to_string()),
            })
            .collect::<Vec<_>>();
        if who.is_empty() {
            return Err(format!("no participants given for item {}", item + 1));
        }
        Ok(AssignSpec { item, who })
    }
}

fn one_based(s: &str) -> Option<usize> {
    s.parse::<usize>().ok()?.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_numbers() {
        let spec: AssignSpec = "2=Alice, 3".parse().unwrap();
        assert_eq!(
            spec,
            AssignSpec { item: 1, who: vec![Who::Name("Alice".into()), Who::Index(2)] }
        );
    }

    #[test]
    fn rejects_missing_separator_and_zero_item() {
        assert!("2".parse::<AssignSpec>().is_err());
        assert!("0=Alice".parse::<AssignSpec>().is_err());
        assert!("1=".parse::<AssignSpec>().is_err());
    }

    #[test]
    fn resolves_against_registry() {
        let people = ParticipantRegistry::with_names(["Alice", "Bob"]);
        assert_eq!(Who::Name("bob".into()).resolve(&people), Some(1));
        assert_eq!(Who::Index(0).resolve(&people), Some(0));
        assert_eq!(Who::Index(2).resolve(&people), None);
        assert_eq!(Who::Name("Cara".into()).resolve(&people), None);
    }

    #[test]
    fn cli_accepts_repeated_flags() {
        let cli = Cli::try_parse_from([
            "tabsplit", "bill.txt", "--text", "-p", "Alice", "-p", "Bob", "-a", "1=1,2", "--auto-split",
        ])
        .unwrap();
        assert!(cli.text && cli.auto_split);
        assert_eq!(cli.people, vec!["Alice", "Bob"]);
        assert_eq!(cli.assignments.len(), 1);
    }
}
