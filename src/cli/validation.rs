use crate::cli::args::{AnalyticsArgs, CliArgs, Command};
use crate::output::OutputFormat;
use crate::pages::TimeRange;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.base_url.as_deref() {
        validate_base_url(raw)?;
    }
    if let Some(raw) = args.header.as_deref() {
        crate::remote::http::parse_header(raw).map_err(|e| e.to_string())?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Command::Analytics(AnalyticsArgs { range: Some(raw) }) = &args.command {
        validate_time_range(raw)?;
    }
    Ok(())
}

pub fn validate_base_url(raw: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(raw).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "invalid --base-url '{raw}': unsupported scheme '{other}'"
        )),
    }
}

pub fn validate_time_range(raw: &str) -> Result<TimeRange, String> {
    TimeRange::parse(raw)
        .ok_or_else(|| format!("invalid --range '{raw}', expected 7d, 30d, 90d or all"))
}

pub fn split_item_spec(raw: &str) -> Result<(String, String, String, String), String> {
    let parts: Vec<&str> = raw.split(',').map(|p| p.trim()).collect();
    match parts.as_slice() {
        [name, stock, alert] => Ok((
            name.to_string(),
            stock.to_string(),
            alert.to_string(),
            String::new(),
        )),
        [name, stock, alert, unit] => Ok((
            name.to_string(),
            stock.to_string(),
            alert.to_string(),
            unit.to_string(),
        )),
        _ => Err(format!(
            "invalid --add '{raw}', expected NAME,STOCK,ALERT[,UNIT]"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn rejects_zero_timeout() {
        let args = CliArgs::parse_from(["gsu-monitor", "--timeout", "0", "inventory"]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(validate_base_url("ftp://panel.local").is_err());
        assert!(validate_base_url("http://panel.local:5000").is_ok());
    }

    #[test]
    fn rejects_unknown_range() {
        let args = CliArgs::parse_from(["gsu-monitor", "analytics", "--range", "1y"]);
        assert_eq!(
            validate(&args).unwrap_err(),
            "invalid --range '1y', expected 7d, 30d, 90d or all"
        );
    }

    #[test]
    fn item_spec_unit_is_optional() {
        let (name, stock, alert, unit) = split_item_spec("Marker, 0, 5").unwrap();
        assert_eq!((name.as_str(), stock.as_str(), alert.as_str()), ("Marker", "0", "5"));
        assert!(unit.is_empty());
        assert!(split_item_spec("Marker").is_err());
    }
}
