//! Wire-level session status and event types
//!
//! Status strings match what polling clients already understand:
//! `noscan`, `scan-wait-confirm`, `scan-confirm`, `scan-cancel`, `expired`.

use serde::{Deserialize, Serialize};

/// Status of a QR login session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QrStatus {
    /// Generated, not yet scanned
    #[default]
    #[serde(rename = "noscan")]
    NoScan,
    /// Scanned, waiting for the scanning client to confirm
    ScanWaitConfirm,
    /// Scanned and confirmed; a user is bound to the session
    ScanConfirm,
    /// Scanned and cancelled by the scanning client
    ScanCancel,
    /// Lifetime elapsed before the flow completed
    Expired,
}

impl QrStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            QrStatus::NoScan => "noscan",
            QrStatus::ScanWaitConfirm => "scan-wait-confirm",
            QrStatus::ScanConfirm => "scan-confirm",
            QrStatus::ScanCancel => "scan-cancel",
            QrStatus::Expired => "expired",
        }
    }

    /// Whether no further transition can leave this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QrStatus::ScanConfirm | QrStatus::ScanCancel | QrStatus::Expired
        )
    }
}

impl std::fmt::Display for QrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QrStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "noscan" => Ok(QrStatus::NoScan),
            "scan-wait-confirm" => Ok(QrStatus::ScanWaitConfirm),
            "scan-confirm" => Ok(QrStatus::ScanConfirm),
            "scan-cancel" => Ok(QrStatus::ScanCancel),
            "expired" => Ok(QrStatus::Expired),
            _ => Err(format!("Invalid QR status: {}", s)),
        }
    }
}

/// Events that drive a session through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrEvent {
    /// The scanning client opened the QR payload
    Scan,
    /// The scanning client approved the login
    Confirm,
    /// The scanning client rejected the login
    Cancel,
    /// The session outlived its TTL
    Expire,
}

impl std::fmt::Display for QrEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QrEvent::Scan => "scan",
            QrEvent::Confirm => "confirm",
            QrEvent::Cancel => "cancel",
            QrEvent::Expire => "expire",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&QrStatus::NoScan).unwrap(),
            "\"noscan\""
        );
        assert_eq!(
            serde_json::to_string(&QrStatus::ScanWaitConfirm).unwrap(),
            "\"scan-wait-confirm\""
        );
        assert_eq!(
            serde_json::from_str::<QrStatus>("\"scan-cancel\"").unwrap(),
            QrStatus::ScanCancel
        );
    }

    #[test]
    fn test_status_parsing_matches_display() {
        for status in [
            QrStatus::NoScan,
            QrStatus::ScanWaitConfirm,
            QrStatus::ScanConfirm,
            QrStatus::ScanCancel,
            QrStatus::Expired,
        ] {
            assert_eq!(status.to_string().parse::<QrStatus>().unwrap(), status);
        }
        assert!("scanned".parse::<QrStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!QrStatus::NoScan.is_terminal());
        assert!(!QrStatus::ScanWaitConfirm.is_terminal());
        assert!(QrStatus::ScanConfirm.is_terminal());
        assert!(QrStatus::ScanCancel.is_terminal());
        assert!(QrStatus::Expired.is_terminal());
    }
}
