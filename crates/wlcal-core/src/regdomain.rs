//! Mobile country code → regulatory domain resolution.
//!
//! Precedence, first match wins:
//!
//! 1. unknown country (0) on an FCC-certified device → `US`
//! 2. country code in [`FCC_COUNTRY_CODES`] → `US`
//! 3. [`MCC_TABLE`] lookup
//! 4. `EU`
//!
//! The FCC rules sit above the table so that markets shipped with the FCC
//! firmware variant keep the US power set even where the table would map
//! the country elsewhere.

use std::fmt;

/// A two-letter regulatory domain, uppercase ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegulatoryDomain([u8; 2]);

impl RegulatoryDomain {
    pub const US: RegulatoryDomain = RegulatoryDomain(*b"US");
    pub const EU: RegulatoryDomain = RegulatoryDomain(*b"EU");

    /// Parse an operator-supplied value. Surrounding whitespace and quotes
    /// are ignored and lowercase letters are accepted; anything other than
    /// exactly two ASCII letters is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        match s.as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => Some(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
            ])),
            _ => None,
        }
    }

    /// Wire form: two ASCII bytes, no terminator.
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ever constructed from ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for RegulatoryDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegdomainSource {
    /// Operator override file.
    Override,
    /// No country known, calibration data says FCC certified.
    FccCertified,
    /// Country code in the FCC override list.
    FccCountry,
    /// Country table lookup.
    Table,
    /// Nothing matched.
    Fallback,
}

impl fmt::Display for RegdomainSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegdomainSource::Override => write!(f, "override"),
            RegdomainSource::FccCertified => write!(f, "fcc-certified"),
            RegdomainSource::FccCountry => write!(f, "fcc-country"),
            RegdomainSource::Table => write!(f, "table"),
            RegdomainSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Mobile country codes served with the FCC power set.
pub const FCC_COUNTRY_CODES: [u32; 14] = [
    302, 310, 311, 312, 313, 314, 315, 316, 332, 334, 466, 722, 724, 732,
];

/// ITU-T E.212 mobile country codes and their ISO 3166 alpha-2 domains.
pub const MCC_TABLE: &[(u32, &str)] = &[
    // Europe
    (202, "GR"), (204, "NL"), (206, "BE"), (208, "FR"), (212, "MC"),
    (213, "AD"), (214, "ES"), (216, "HU"), (218, "BA"), (219, "HR"),
    (220, "RS"), (222, "IT"), (225, "VA"), (226, "RO"), (228, "CH"),
    (230, "CZ"), (231, "SK"), (232, "AT"), (234, "GB"), (235, "GB"),
    (238, "DK"), (240, "SE"), (242, "NO"), (244, "FI"), (246, "LT"),
    (247, "LV"), (248, "EE"), (250, "RU"), (255, "UA"), (257, "BY"),
    (259, "MD"), (260, "PL"), (262, "DE"), (266, "GI"), (268, "PT"),
    (270, "LU"), (272, "IE"), (274, "IS"), (276, "AL"), (278, "MT"),
    (280, "CY"), (282, "GE"), (283, "AM"), (284, "BG"), (286, "TR"),
    (288, "FO"), (290, "GL"), (292, "SM"), (293, "SI"), (294, "MK"),
    (295, "LI"), (297, "ME"),
    // North America and the Caribbean
    (302, "CA"), (308, "PM"), (310, "US"), (311, "US"), (312, "US"),
    (313, "US"), (314, "US"), (315, "US"), (316, "US"), (330, "PR"),
    (332, "VI"), (334, "MX"), (338, "JM"), (340, "GP"), (342, "BB"),
    (344, "AG"), (346, "KY"), (348, "VG"), (350, "BM"), (352, "GD"),
    (354, "MS"), (356, "KN"), (358, "LC"), (360, "VC"), (362, "CW"),
    (363, "AW"), (364, "BS"), (365, "AI"), (366, "DM"), (368, "CU"),
    (370, "DO"), (372, "HT"), (374, "TT"), (376, "TC"),
    // Asia
    (400, "AZ"), (401, "KZ"), (402, "BT"), (404, "IN"), (405, "IN"),
    (406, "IN"), (410, "PK"), (412, "AF"), (413, "LK"), (414, "MM"),
    (415, "LB"), (416, "JO"), (417, "SY"), (418, "IQ"), (419, "KW"),
    (420, "SA"), (421, "YE"), (422, "OM"), (424, "AE"), (425, "IL"),
    (426, "BH"), (427, "QA"), (428, "MN"), (429, "NP"), (430, "AE"),
    (431, "AE"), (432, "IR"), (434, "UZ"), (436, "TJ"), (437, "KG"),
    (438, "TM"), (440, "JP"), (441, "JP"), (450, "KR"), (452, "VN"),
    (454, "HK"), (455, "MO"), (456, "KH"), (457, "LA"), (460, "CN"),
    (461, "CN"), (466, "TW"), (467, "KP"), (470, "BD"), (472, "MV"),
    // Oceania
    (502, "MY"), (505, "AU"), (510, "ID"), (514, "TL"), (515, "PH"),
    (520, "TH"), (525, "SG"), (528, "BN"), (530, "NZ"), (536, "NR"),
    (537, "PG"), (539, "TO"), (540, "SB"), (541, "VU"), (542, "FJ"),
    (543, "WF"), (544, "AS"), (545, "KI"), (546, "NC"), (547, "PF"),
    (548, "CK"), (549, "WS"), (550, "FM"), (551, "MH"), (552, "PW"),
    // Africa
    (602, "EG"), (603, "DZ"), (604, "MA"), (605, "TN"), (606, "LY"),
    (607, "GM"), (608, "SN"), (609, "MR"), (610, "ML"), (611, "GN"),
    (612, "CI"), (613, "BF"), (614, "NE"), (615, "TG"), (616, "BJ"),
    (617, "MU"), (618, "LR"), (619, "SL"), (620, "GH"), (621, "NG"),
    (622, "TD"), (623, "CF"), (624, "CM"), (625, "CV"), (626, "ST"),
    (627, "GQ"), (628, "GA"), (629, "CG"), (630, "CD"), (631, "AO"),
    (632, "GW"), (633, "SC"), (634, "SD"), (635, "RW"), (636, "ET"),
    (637, "SO"), (638, "DJ"), (639, "KE"), (640, "TZ"), (641, "UG"),
    (642, "BI"), (643, "MZ"), (645, "ZM"), (646, "MG"), (647, "RE"),
    (648, "ZW"), (649, "NA"), (650, "MW"), (651, "LS"), (652, "BW"),
    (653, "SZ"), (654, "KM"), (655, "ZA"), (657, "ER"),
    // Central and South America
    (702, "BZ"), (704, "GT"), (706, "SV"), (708, "HN"), (710, "NI"),
    (712, "CR"), (714, "PA"), (716, "PE"), (722, "AR"), (724, "BR"),
    (730, "CL"), (732, "CO"), (734, "VE"), (736, "BO"), (738, "GY"),
    (740, "EC"), (742, "GF"), (744, "PY"), (746, "SR"), (748, "UY"),
    (750, "FK"),
];

/// Resolve a mobile country code (0 = unknown) to a regulatory domain.
pub fn resolve(country_code: u32, fcc: bool) -> RegulatoryDomain {
    resolve_with_source(country_code, fcc).0
}

/// Like [`resolve`], also reporting which rule matched.
pub fn resolve_with_source(country_code: u32, fcc: bool) -> (RegulatoryDomain, RegdomainSource) {
    if country_code == 0 && fcc {
        return (RegulatoryDomain::US, RegdomainSource::FccCertified);
    }
    if FCC_COUNTRY_CODES.contains(&country_code) {
        return (RegulatoryDomain::US, RegdomainSource::FccCountry);
    }
    MCC_TABLE
        .iter()
        .find(|(mcc, _)| *mcc == country_code)
        .and_then(|(_, alpha2)| RegulatoryDomain::parse(alpha2))
        .map(|domain| (domain, RegdomainSource::Table))
        .unwrap_or((RegulatoryDomain::EU, RegdomainSource::Fallback))
}

/// Mobile country code from an MCC+MNC operator code such as `"310260"`.
///
/// Returns `None` for anything that does not start with three digits or
/// whose country code is zero.
pub fn mcc_from_operator_code(code: &str) -> Option<u32> {
    let code = code.trim();
    let digits = code.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&mcc| mcc != 0)
}
