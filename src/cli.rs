use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "circuit-picker",
    version,
    about = "Pick the services of a circuit from a terminal dropdown"
)]
pub struct Args {
    /// TOML file with `[[services]]` entries to seed the list (defaults to mock services)
    #[arg(short, long)]
    pub services: Option<PathBuf>,

    /// Theme name, overriding the config file (e.g. "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Circuit name shown above the dropdown
    #[arg(short, long, default_value = "circuit")]
    pub circuit: String,

    /// Action to apply before the UI starts, e.g. `select=cargill-target2` (repeatable)
    #[arg(short, long = "dispatch", value_name = "TAG=SERVICE_ID", value_parser = parse_dispatch)]
    pub dispatch: Vec<(String, String)>,
}

fn parse_dispatch(s: &str) -> Result<(String, String), String> {
    let (tag, service_id) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=SERVICE_ID, got {s:?}"))?;
    Ok((tag.trim().to_string(), service_id.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["circuit-picker"]);
        assert!(args.services.is_none());
        assert!(args.theme.is_none());
        assert_eq!(args.circuit, "circuit");
        assert!(args.dispatch.is_empty());
    }

    #[test]
    fn test_dispatch_flag() {
        let args = Args::parse_from([
            "circuit-picker",
            "-d",
            "select=cargill-target2",
            "--dispatch",
            "select = cargill-target4",
        ]);
        assert_eq!(
            args.dispatch,
            vec![
                ("select".to_string(), "cargill-target2".to_string()),
                ("select".to_string(), "cargill-target4".to_string()),
            ]
        );
        assert!(Args::try_parse_from(["circuit-picker", "-d", "select"]).is_err());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "circuit-picker",
            "--services",
            "seed.toml",
            "-t",
            "Catppuccin Latte",
            "-c",
            "acme-01",
        ]);
        assert_eq!(args.services, Some(PathBuf::from("seed.toml")));
        assert_eq!(args.theme.as_deref(), Some("Catppuccin Latte"));
        assert_eq!(args.circuit, "acme-01");
    }
}
