//! RSSI decoding and table generation for the cc2500 radio.
//!
//! The chip reports RSSI as a two's-complement register byte with 0.5 dBm
//! resolution (datasheet section 17.3). This module decodes the full byte
//! domain into dBm and renders the firmware lookup table, plus a per-byte
//! report relating each reading to the transmit power needed to hit a
//! target received power.

use std::io::Write;

use serde::Serialize;

use crate::power::{self, Dbm, Watt};

const RSSI_OFFSET_DBM: Dbm = 72.0;

pub const DEFAULT_TARGET_DBM: Dbm = -80.0;
pub const DEFAULT_TX_POWER_DBM: Dbm = 1.0;

/// Decode a raw RSSI register byte into dBm.
#[must_use]
pub fn decode_rssi(byte: u8) -> Dbm {
    if byte >= 128 {
        (f64::from(byte) - 256.0) / 2.0 - RSSI_OFFSET_DBM
    } else {
        f64::from(byte) / 2.0 - RSSI_OFFSET_DBM
    }
}

/// All 256 decoded RSSI readings, indexed by register byte.
#[derive(Debug, Clone)]
pub struct RssiTable {
    values: [Dbm; 256],
}

/// One row of the power report derived from [`RssiTable`].
#[derive(Debug, Clone, Serialize)]
pub struct PowerReportRow {
    #[serde(rename = "rssi(dBm)")]
    pub rssi_dbm: Dbm,
    #[serde(rename = "rssi(W)")]
    pub rssi_watt: Watt,
    pub alpha: f64,
    #[serde(rename = "tx_power(dBm)")]
    pub tx_power_dbm: Dbm,
    #[serde(rename = "tx_power(W)")]
    pub tx_power_watt: Watt,
}

impl Default for RssiTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RssiTable {
    /// Decode the full register byte domain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|byte| decode_rssi(byte as u8)),
        }
    }

    #[must_use]
    pub fn values(&self) -> &[Dbm; 256] {
        &self.values
    }

    /// Render the table as the C array literal used in firmware source.
    ///
    /// A newline goes in after every tenth entry past the first, and the
    /// declared length stays 255, matching the legacy header byte for byte.
    #[must_use]
    pub fn firmware_literal(&self) -> String {
        let mut s = String::from("energy_t rssi_table[255] = { ");
        for (m, value) in self.values.iter().enumerate() {
            s.push_str(&format!("{value:.1},"));
            if m % 10 == 0 && m > 0 {
                s.push('\n');
            }
        }
        s.push_str(" };");
        s
    }

    /// Derive attenuation and required transmit power for every byte, given
    /// a target received power and a reference transmit power in dBm.
    ///
    /// For a reading `w`, `alpha` is the channel attenuation observed when
    /// transmitting at the reference power, and the reported tx power is
    /// what the sender must use for the receiver to see the target power
    /// over that same channel.
    #[must_use]
    pub fn power_report(&self, target_dbm: Dbm, tx_power_dbm: Dbm) -> Vec<PowerReportRow> {
        let target_watt = power::dbm_to_watt(target_dbm);
        let tx_watt = power::dbm_to_watt(tx_power_dbm);
        self.values
            .iter()
            .map(|&rssi_dbm| {
                let rssi_watt = power::dbm_to_watt(rssi_dbm);
                let alpha = rssi_watt / tx_watt;
                let required_watt = target_watt / alpha;
                PowerReportRow {
                    rssi_dbm,
                    rssi_watt,
                    alpha,
                    tx_power_dbm: round_tenth(power::watt_to_dbm(required_watt)),
                    tx_power_watt: required_watt,
                }
            })
            .collect()
    }
}

/// Write the report rows as CSV, header first.
pub fn write_report<W: Write>(out: W, rows: &[PowerReportRow]) -> color_eyre::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_matches_datasheet_convention() {
        assert_eq!(decode_rssi(0), -72.0);
        assert_eq!(decode_rssi(127), -8.5);
        assert_eq!(decode_rssi(128), -136.0);
        assert_eq!(decode_rssi(255), -72.5);
    }

    #[test]
    fn decoded_values_follow_the_piecewise_rule() {
        let table = RssiTable::new();
        for (m, value) in table.values().iter().enumerate() {
            let expected = if m < 128 {
                m as f64 / 2.0 - 72.0
            } else {
                (m as f64 - 256.0) / 2.0 - 72.0
            };
            assert_eq!(*value, expected, "byte {m}");
            assert_eq!(value * 2.0, (value * 2.0).round(), "byte {m} not 0.5 dBm");
        }
    }

    #[test]
    fn firmware_literal_reproduces_the_legacy_layout() {
        let literal = RssiTable::new().firmware_literal();
        assert!(literal.starts_with("energy_t rssi_table[255] = { -72.0,"));
        assert!(literal.ends_with("-72.5, };"));
        assert_eq!(literal.matches('\n').count(), 25);

        let body = literal
            .strip_prefix("energy_t rssi_table[255] = { ")
            .unwrap()
            .strip_suffix(" };")
            .unwrap();
        let tokens: Vec<&str> = body
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(tokens.len(), 256);
        assert!(tokens.iter().all(|t| t.parse::<f64>().is_ok()));
    }

    #[test]
    fn firmware_literal_breaks_after_every_tenth_entry() {
        let literal = RssiTable::new().firmware_literal();
        let lines: Vec<&str> = literal.lines().collect();
        assert_eq!(lines.len(), 26);
        // Entry 10 decodes to -67.0 and ends the first line.
        assert!(lines[0].ends_with("-67.0,"));
        assert!(lines[1].starts_with("-66.5,"));
        assert!(lines[25].starts_with("-74.5,"));
    }

    #[test]
    fn alpha_rises_with_rssi_within_each_branch() {
        let rows = RssiTable::new().power_report(DEFAULT_TARGET_DBM, DEFAULT_TX_POWER_DBM);
        for m in 1..=127 {
            assert!(rows[m].alpha > rows[m - 1].alpha, "byte {m}");
        }
        for m in 129..=255 {
            assert!(rows[m].alpha > rows[m - 1].alpha, "byte {m}");
        }
    }

    #[test]
    fn reading_at_the_target_needs_the_reference_power() {
        // Byte 240 decodes to exactly -80.0 dBm, so with the default -80 dBm
        // target the channel already delivers it: the required tx power is
        // the 1 dBm reference itself.
        let rows = RssiTable::new().power_report(DEFAULT_TARGET_DBM, DEFAULT_TX_POWER_DBM);
        assert_eq!(rows[240].rssi_dbm, -80.0);
        assert!((rows[240].tx_power_dbm - 1.0).abs() < 1e-9);
        let reference_watt = power::dbm_to_watt(DEFAULT_TX_POWER_DBM);
        assert!((rows[240].tx_power_watt - reference_watt).abs() / reference_watt < 1e-9);
    }

    #[test]
    fn required_power_compensates_the_channel() {
        let rows = RssiTable::new().power_report(-80.0, 1.0);
        for m in [0usize, 64, 127, 128, 200, 255] {
            let received_watt = rows[m].alpha * rows[m].tx_power_watt;
            let received_dbm = power::watt_to_dbm(received_watt);
            assert!((received_dbm + 80.0).abs() < 1e-6, "byte {m}");
        }
    }

    #[test]
    fn report_csv_has_header_and_256_rows() {
        let rows = RssiTable::new().power_report(DEFAULT_TARGET_DBM, DEFAULT_TX_POWER_DBM);
        let mut buf = Vec::new();
        write_report(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 257);
        assert_eq!(lines[0], "rssi(dBm),rssi(W),alpha,tx_power(dBm),tx_power(W)");
        assert!(lines[1..].iter().all(|l| l.split(',').count() == 5));
    }

    #[test]
    fn reported_dbm_is_rounded_to_one_decimal() {
        let rows = RssiTable::new().power_report(DEFAULT_TARGET_DBM, DEFAULT_TX_POWER_DBM);
        for row in &rows {
            let tenths = row.tx_power_dbm * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9);
        }
    }
}
