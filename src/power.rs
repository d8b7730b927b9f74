//! Power unit conversions and the cc2500 PA table calibration data.

pub type Dbm = f64;
pub type Watt = f64;

/// Convert a power level from dBm to watts.
#[must_use]
pub fn dbm_to_watt(p: Dbm) -> Watt {
    10f64.powf(p / 10.0) / 1000.0
}

/// Convert a power level from watts to dBm.
#[must_use]
pub fn watt_to_dbm(p: Watt) -> Dbm {
    10.0 * (1000.0 * p).log10()
}

/// PATABLE register settings paired with their measured output power in dBm,
/// sorted ascending by power. Settings that map to the same measured power
/// keep their measurement order.
pub const PA_TABLE: [(u8, Dbm); 140] = [
    (0x00, -65.4),
    (0x40, -33.9),
    (0x50, -31.1),
    (0x60, -29.5),
    (0x70, -29.4),
    (0x80, -29.3),
    (0x44, -28.4),
    (0x90, -26.4),
    (0x41, -26.3),
    (0x42, -26.2),
    (0xC0, -25.9),
    (0x48, -25.8),
    (0x43, -25.6),
    (0x54, -25.4),
    (0xA0, -24.9),
    (0xB0, -24.8),
    (0x84, -23.7),
    (0x74, -23.6),
    (0x51, -23.4),
    (0x52, -23.2),
    (0x53, -22.7),
    (0x58, -22.5),
    (0x5C, -22.2),
    (0xE0, -21.9),
    (0x61, -21.8),
    (0x81, -21.7),
    (0x82, -21.6),
    (0x72, -21.5),
    (0x88, -21.1),
    (0x83, -21.0),
    (0x8C, -20.8),
    (0x94, -20.6),
    (0x6C, -20.5),
    (0x45, -20.4),
    (0xC4, -20.3),
    (0x46, -20.2),
    (0x47, -19.7),
    (0xA4, -19.0),
    (0xB4, -18.9),
    (0x49, -18.8),
    (0x91, -18.7),
    (0x4E, -18.6),
    (0x92, -18.5),
    (0xC1, -18.3),
    (0xC2, -18.2),
    (0x93, -18.0),
    (0x4B, -17.9),
    (0x4F, -17.8),
    (0xC3, -17.7),
    (0xC8, -17.5),
    (0xD4, -17.4),
    (0xCC, -17.3),
    (0xA1, -17.1),
    (0xA2, -17.0),
    (0xB2, -16.9),
    (0xA3, -16.5),
    (0xB3, -16.4),
    (0xA8, -16.0),
    (0xB8, -15.9),
    (0x55, -15.8),
    (0x56, -15.7),
    (0x85, -15.6),
    (0x86, -15.5),
    (0xD2, -15.4),
    (0x87, -15.0),
    (0xD3, -14.8),
    (0xD8, -14.3),
    (0xE1, -14.2),
    (0x89, -14.1),
    (0x8D, -14.0),
    (0x8A, -13.9),
    (0x8E, -13.8),
    (0xE3, -13.5),
    (0xF3, -13.5),
    (0x65, -13.4),
    (0x8B, -13.3),
    (0x66, -13.2),
    (0x59, -13.1),
    (0x76, -13.0),
    (0x5A, -12.9),
    (0x5D, -12.9),
    (0xE8, -12.8),
    (0x5E, -12.7),
    (0xEC, -12.5),
    (0xFC, -12.4),
    (0x67, -12.3),
    (0x77, -12.2),
    (0x5B, -12.1),
    (0xC5, -12.0),
    (0x5F, -11.9),
    (0xC6, -11.8),
    (0xC7, -11.3),
    (0x95, -10.9),
    (0x96, -10.7),
    (0xC9, -10.4),
    (0xCA, -10.3),
    (0xCE, -10.2),
    (0x97, -10.1),
    (0xCB, -9.8),
    (0xCF, -9.7),
    (0xB5, -8.5),
    (0x6A, -8.4),
    (0x6D, -8.3),
    (0x99, -8.0),
    (0x9D, -7.9),
    (0x9A, -7.8),
    (0x9E, -7.7),
    (0xD5, -7.6),
    (0x7E, -7.5),
    (0xD6, -7.4),
    (0x9B, -7.2),
    (0x9F, -7.0),
    (0xD7, -6.8),
    (0x7B, -6.5),
    (0x7F, -6.1),
    (0xE5, -5.7),
    (0xE6, -5.5),
    (0xE7, -4.7),
    (0xD9, -4.6),
    (0xDA, -4.4),
    (0xDE, -4.3),
    (0xDB, -3.8),
    (0xDF, -3.7),
    (0xAA, -3.5),
    (0xAE, -3.1),
    (0xBE, -2.7),
    (0xAB, -2.3),
    (0xAF, -1.9),
    (0xBB, -1.8),
    (0xBF, -1.3),
    (0xE9, -0.8),
    (0xF9, -0.6),
    (0xEA, -0.4),
    (0xFA, -0.2),
    (0xFD, -0.1),
    (0xEE, 0.0),
    (0xFE, 0.3),
    (0xEB, 0.7),
    (0xEF, 1.1),
    (0xFF, 1.5),
];

/// Output power in dBm for a PATABLE register setting, if it is calibrated.
#[must_use]
pub fn setting_to_dbm(setting: u8) -> Option<Dbm> {
    PA_TABLE
        .iter()
        .find(|(s, _)| *s == setting)
        .map(|(_, dbm)| *dbm)
}

/// Find the register setting whose output power is closest to `power`.
/// Returns the setting and its actual output power; the first entry wins
/// on a tie.
#[must_use]
pub fn closest_setting(power: Dbm) -> (u8, Dbm) {
    let mut closest = PA_TABLE[0];
    let mut difference = f64::INFINITY;
    for (setting, dbm) in PA_TABLE {
        if (power - dbm).abs() < difference {
            difference = (power - dbm).abs();
            closest = (setting, dbm);
        }
    }
    closest
}
