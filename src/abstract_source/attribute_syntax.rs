//! LDAP hands us every attribute value as a string or an opaque byte buffer.
//! This module recovers the richer kinds for well-known Active Directory
//! attributes so that timestamps, intervals and counters survive into the
//! document as something more useful than raw strings.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::collections::HashSet;

use crate::file_format::value::SourceValue;

lazy_static! {
    /// GeneralizedTime syntax, e.g. `20211222103000.0Z`.
    static ref GENERALIZED_TIME_ATTRIBUTES: HashSet<&'static str> = [
        "whencreated",
        "whenchanged",
        "dscorepropagationdata",
        "createtimestamp",
        "modifytimestamp",
        "mspki-certificate-expiration",
    ]
    .into_iter()
    .collect();

    /// Large integers counting 100ns ticks since 1601-01-01 UTC.
    static ref FILETIME_ATTRIBUTES: HashSet<&'static str> = [
        "accountexpires",
        "badpasswordtime",
        "lastlogoff",
        "lastlogon",
        "lastlogontimestamp",
        "lockouttime",
        "pwdlastset",
        "creationtime",
        "ms-mcs-admpwdexpirationtime",
    ]
    .into_iter()
    .collect();

    /// Negative 100ns tick counts describing a length of time.
    static ref INTERVAL_ATTRIBUTES: HashSet<&'static str> = [
        "forcelogoff",
        "lockoutduration",
        "lockoutobservationwindow",
        "maxpwdage",
        "minpwdage",
    ]
    .into_iter()
    .collect();

    /// Multi-valued in the schema, so kept as sequences even when an object
    /// happens to carry a single value.
    static ref MULTI_VALUED_ATTRIBUTES: HashSet<&'static str> = [
        "member",
        "memberof",
        "objectclass",
        "serviceprincipalname",
        "dscorepropagationdata",
        "proxyaddresses",
        "othermailbox",
        "othertelephone",
        "url",
        "sidhistory",
        "msds-allowedtodelegateto",
        "msds-keycredentiallink",
        "namingcontexts",
        "subrefs",
        "wellknownobjects",
        "otherwellknownobjects",
        "dnsrecord",
        "usercertificate",
    ]
    .into_iter()
    .collect();

    static ref INTEGER_ATTRIBUTES: HashSet<&'static str> = [
        "admincount",
        "badpwdcount",
        "codepage",
        "countrycode",
        "grouptype",
        "instancetype",
        "lockoutthreshold",
        "logoncount",
        "machineaccountquota",
        "minpwdlength",
        "msds-behavior-version",
        "msds-supportedencryptiontypes",
        "primarygroupid",
        "pwdhistorylength",
        "pwdproperties",
        "samaccounttype",
        "systemflags",
        "useraccountcontrol",
        "usnchanged",
        "usncreated",
    ]
    .into_iter()
    .collect();
}

type BinaryFormatter = fn(&[u8]) -> Option<String>;

/// Binary attributes with a canonical textual form.
fn binary_formatter(name: &str) -> Option<BinaryFormatter> {
    match name {
        "objectguid" | "schemaidguid" | "attributesecurityguid" => {
            Some(format_guid as BinaryFormatter)
        }
        "objectsid" | "securityidentifier" | "sidhistory" => Some(format_sid as BinaryFormatter),
        _ => None,
    }
}

/// `FILETIME` value that means "never".
const FILETIME_NEVER: i64 = i64::MAX;
const TICKS_PER_SECOND: i64 = 10_000_000;
const SECONDS_FROM_1601_TO_1970: i64 = 11_644_473_600;

pub fn parse_generalized_time(s: &str) -> Option<DateTime<FixedOffset>> {
    if s.len() < 14 || !s.is_char_boundary(14) {
        return None;
    }
    let (stamp, rest) = s.split_at(14);
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;

    // Fractional seconds are dropped; the document only has second precision.
    let zone = rest.trim_start_matches(|c: char| c == '.' || c == ',' || c.is_ascii_digit());
    let offset = match zone {
        "" | "Z" => FixedOffset::east_opt(0)?,
        _ => {
            let sign = zone.chars().next()?;
            let digits = &zone[sign.len_utf8()..];
            if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let hours: i32 = digits[..2].parse().ok()?;
            let minutes: i32 = digits[2..].parse().ok()?;
            let seconds = hours * 3600 + minutes * 60;
            match sign {
                '+' => FixedOffset::east_opt(seconds)?,
                '-' => FixedOffset::west_opt(seconds)?,
                _ => return None,
            }
        }
    };
    offset.from_local_datetime(&naive).single()
}

pub fn filetime_to_timestamp(ticks: i64) -> Option<DateTime<FixedOffset>> {
    let utc = if ticks == FILETIME_NEVER {
        Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).single()?
    } else if ticks < 0 {
        return None;
    } else {
        let secs = ticks / TICKS_PER_SECOND - SECONDS_FROM_1601_TO_1970;
        DateTime::<Utc>::from_timestamp(secs, 0)?
    };
    Some(utc.fixed_offset())
}

pub fn interval_to_duration(ticks: i64) -> Duration {
    let secs = ticks.unsigned_abs() / TICKS_PER_SECOND as u64;
    Duration::seconds(secs as i64)
}

/// Mixed-endian GUID layout as used by Active Directory.
pub fn format_guid(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 16 {
        return None;
    }
    let b = bytes;
    Some(format!(
        "{{{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
        b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9], b[10], b[11], b[12], b[13],
        b[14], b[15]
    ))
}

/// `S-<revision>-<authority>-<sub authorities...>`.
pub fn format_sid(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 8 {
        return None;
    }
    let revision = bytes[0];
    let count = bytes[1] as usize;
    if bytes.len() != 8 + 4 * count {
        return None;
    }
    let authority = bytes[2..8]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

    let mut sid = format!("S-{}-{}", revision, authority);
    for chunk in bytes[8..].chunks_exact(4) {
        let sub = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        sid.push_str(&format!("-{}", sub));
    }
    Some(sid)
}

fn type_text_value(lower_name: &str, raw: String) -> SourceValue {
    if GENERALIZED_TIME_ATTRIBUTES.contains(lower_name) {
        if let Some(ts) = parse_generalized_time(&raw) {
            return SourceValue::Timestamp(ts);
        }
    } else if FILETIME_ATTRIBUTES.contains(lower_name) {
        if let Ok(ticks) = raw.parse::<i64>() {
            return match filetime_to_timestamp(ticks) {
                Some(ts) => SourceValue::Timestamp(ts),
                None => SourceValue::Integer(ticks),
            };
        }
    } else if INTERVAL_ATTRIBUTES.contains(lower_name) {
        if let Ok(ticks) = raw.parse::<i64>() {
            return SourceValue::Duration(interval_to_duration(ticks));
        }
    } else if INTEGER_ATTRIBUTES.contains(lower_name) {
        if let Ok(i) = raw.parse::<i64>() {
            return SourceValue::Integer(i);
        }
    } else if let Some(formatter) = binary_formatter(lower_name) {
        // Short binary values can come through as valid UTF-8 text.
        if let Some(text) = formatter(raw.as_bytes()) {
            return SourceValue::String(text);
        }
    }
    SourceValue::String(raw)
}

fn type_binary_value(lower_name: &str, raw: Vec<u8>) -> SourceValue {
    match binary_formatter(lower_name).and_then(|formatter| formatter(&raw)) {
        Some(text) => SourceValue::String(text),
        None => SourceValue::Bytes(raw),
    }
}

fn collapse(lower_name: &str, mut values: Vec<SourceValue>) -> SourceValue {
    if values.len() == 1 && !MULTI_VALUED_ATTRIBUTES.contains(lower_name) {
        if let Some(value) = values.pop() {
            return value;
        }
    }
    SourceValue::Sequence(values)
}

/// Type a textual attribute.  A single value becomes a scalar and several
/// values an ordered sequence, except that schema multi-valued attributes
/// are always sequences.
pub fn type_text_attribute(name: &str, values: Vec<String>) -> SourceValue {
    let lower_name = name.to_lowercase();
    collapse(
        &lower_name,
        values
            .into_iter()
            .map(|raw| type_text_value(&lower_name, raw))
            .collect(),
    )
}

pub fn type_binary_attribute(name: &str, values: Vec<Vec<u8>>) -> SourceValue {
    let lower_name = name.to_lowercase();
    collapse(
        &lower_name,
        values
            .into_iter()
            .map(|raw| type_binary_value(&lower_name, raw))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::value::normalize_value;
    use serde_json::json;

    #[test]
    fn generalized_time() {
        let ts = parse_generalized_time("20211222103000.0Z").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2021-12-22 10:30:00");
        let ts = parse_generalized_time("20211222103000-0500").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(ts.format("%H").to_string(), "10");
        assert!(parse_generalized_time("garbage").is_none());
    }

    #[test]
    fn filetime() {
        // 2021-01-01 00:00:00 UTC
        let ts = filetime_to_timestamp(132539328000000000).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2021-01-01 00:00:00");
        let never = filetime_to_timestamp(i64::MAX).unwrap();
        assert_eq!(never.format("%Y").to_string(), "9999");
        assert_eq!(
            filetime_to_timestamp(0).unwrap().format("%Y-%m-%d").to_string(),
            "1601-01-01"
        );
    }

    #[test]
    fn intervals() {
        // 30 minutes
        assert_eq!(interval_to_duration(-18_000_000_000).num_seconds(), 1800);
        assert_eq!(
            normalize_value(type_text_attribute("lockoutDuration", vec!["-18000000000".into()])),
            json!(1800)
        );
    }

    #[test]
    fn guid_and_sid() {
        let guid: Vec<u8> = (0u8..16).collect();
        assert_eq!(
            format_guid(&guid).unwrap(),
            "{03020100-0504-0706-0809-0a0b0c0d0e0f}"
        );
        let sid = vec![
            1, 4, 0, 0, 0, 0, 0, 5, 21, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 244, 1, 0, 0,
        ];
        assert_eq!(format_sid(&sid).unwrap(), "S-1-5-21-1-2-500");
        assert_eq!(
            type_binary_attribute("objectSid", vec![sid]),
            SourceValue::String("S-1-5-21-1-2-500".into())
        );
    }

    #[test]
    fn values_collapse_by_count() {
        assert_eq!(
            type_text_attribute("userAccountControl", vec!["512".into()]),
            SourceValue::Integer(512)
        );
        assert_eq!(
            type_text_attribute("memberOf", vec!["CN=a".into(), "CN=b".into()]),
            SourceValue::Sequence(vec!["CN=a".into(), "CN=b".into()])
        );
        assert_eq!(
            type_binary_attribute("jpegPhoto", vec![vec![0xff, 0xd8]]),
            SourceValue::Bytes(vec![0xff, 0xd8])
        );
    }

    #[test]
    fn multi_valued_attributes_stay_sequences() {
        assert_eq!(
            type_text_attribute("memberOf", vec!["CN=a".into()]),
            SourceValue::Sequence(vec!["CN=a".into()])
        );
        assert_eq!(
            normalize_value(type_text_attribute("objectClass", vec!["top".into()])),
            json!(["top"])
        );
        assert_eq!(
            type_text_attribute("mail", vec!["a@x".into()]),
            SourceValue::String("a@x".into())
        );
    }

    #[test]
    fn unparseable_values_stay_strings() {
        assert_eq!(
            type_text_attribute("pwdLastSet", vec!["soon".into()]),
            SourceValue::String("soon".into())
        );
    }
}
