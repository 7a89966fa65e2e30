use serde::Serialize;

use crate::error::CliError;

/// Writes one JSON document to stdout. Logs go to stderr, so stdout stays
/// machine-readable.
pub fn render<T>(value: &T, pretty: bool) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    println!("{}", to_json(value, pretty)?);
    Ok(())
}

fn to_json<T>(value: &T, pretty: bool) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_and_pretty_forms() {
        let value = json!({"status": "ok"});
        assert_eq!(to_json(&value, false).expect("serialize"), r#"{"status":"ok"}"#);
        assert!(to_json(&value, true).expect("serialize").contains('\n'));
    }
}
