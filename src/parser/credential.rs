use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::ParseError;

/// Token and expiry extracted from helper output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct HelperDocument {
    credential: Option<CredentialSection>,
}

#[derive(Debug, Deserialize)]
struct CredentialSection {
    access_token: Option<String>,
    token_expiry: Option<String>,
}

/// Decode `{"credential": {"access_token": .., "token_expiry": ..}}`.
///
/// Unknown fields are ignored, missing ones are errors.
pub fn parse_credential(stdout: &[u8]) -> Result<Credential, ParseError> {
    let document: HelperDocument = serde_json::from_slice(stdout)
        .map_err(|err| ParseError::Malformed(err.to_string()))?;

    let credential = document.credential.ok_or(ParseError::MissingField("credential"))?;
    let access_token = credential
        .access_token
        .ok_or(ParseError::MissingField("credential.access_token"))?;
    let token_expiry = credential
        .token_expiry
        .ok_or(ParseError::MissingField("credential.token_expiry"))?;

    if access_token.is_empty() {
        return Err(ParseError::EmptyToken);
    }
    if !access_token.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ParseError::InvalidToken);
    }

    let expiry = parse_expiry(&token_expiry)?;
    debug!(expiry = %expiry, "helper credential decoded");

    Ok(Credential { access_token, expiry })
}

/// RFC 3339 first, then naive ISO-8601 read as UTC.
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let value = value.trim();
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(rfc_err) => {
            const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|naive| naive.and_utc())
                .ok_or_else(|| ParseError::InvalidExpiry {
                    value: value.to_owned(),
                    reason: rfc_err.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_gcloud_config_helper_output() {
        let stdout = br#"{
            "configuration": {"active_configuration": "default", "properties": {"core": {"account": "me@example.com"}}},
            "credential": {
                "access_token": "ya29.a0AfH6SM",
                "id_token": "eyJhbGciOi",
                "token_expiry": "2022-07-25T18:04:05Z"
            },
            "sentinels": {"config_sentinel": "/home/me/.config/gcloud/config_sentinel"}
        }"#;

        let credential = parse_credential(stdout).unwrap();
        assert_eq!(credential.access_token, "ya29.a0AfH6SM");
        assert_eq!(credential.expiry, Utc.with_ymd_and_hms(2022, 7, 25, 18, 4, 5).unwrap());
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(parse_credential(b"not json"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse_credential(b"[1,2]"), Err(ParseError::Malformed(_))));
        assert!(matches!(
            parse_credential(br#"{"credential": "flat"}"#),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        assert_eq!(parse_credential(b"{}"), Err(ParseError::MissingField("credential")));
        assert_eq!(
            parse_credential(br#"{"credential": {"token_expiry": "2022-07-25T18:04:05Z"}}"#),
            Err(ParseError::MissingField("credential.access_token"))
        );
        assert_eq!(
            parse_credential(br#"{"credential": {"access_token": "T1"}}"#),
            Err(ParseError::MissingField("credential.token_expiry"))
        );
    }

    #[test]
    fn empty_or_unprintable_token_is_rejected() {
        assert_eq!(
            parse_credential(br#"{"credential": {"access_token": "", "token_expiry": "2022-07-25T18:04:05Z"}}"#),
            Err(ParseError::EmptyToken)
        );
        assert_eq!(
            parse_credential(br#"{"credential": {"access_token": "a b\n", "token_expiry": "2022-07-25T18:04:05Z"}}"#),
            Err(ParseError::InvalidToken)
        );
    }

    #[test]
    fn expiry_accepts_offsets_and_naive_timestamps() {
        let expected = Utc.with_ymd_and_hms(2022, 7, 25, 18, 4, 5).unwrap();
        assert_eq!(parse_expiry("2022-07-25T20:04:05+02:00").unwrap(), expected);
        assert_eq!(parse_expiry("2022-07-25T18:04:05").unwrap(), expected);
        assert_eq!(parse_expiry("2022-07-25 18:04:05").unwrap(), expected);
        assert_eq!(
            parse_expiry("2022-07-25T18:04:05.250000").unwrap(),
            expected + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn durations_are_not_timestamps() {
        assert!(matches!(parse_expiry("3600"), Err(ParseError::InvalidExpiry { .. })));
        assert!(matches!(parse_expiry("tomorrow"), Err(ParseError::InvalidExpiry { .. })));
    }
}
