use super::table::ColumnKind;
use std::collections::HashMap;
use std::sync::OnceLock;

/// One canonical column together with the source-observed header spellings
/// that normalize into it.
#[derive(Debug)]
pub(crate) struct ColumnSpec {
    pub(crate) canonical: &'static str,
    pub(crate) aliases: &'static [&'static str],
    pub(crate) kind: ColumnKind,
    pub(crate) required: bool,
}

pub(crate) const BOOKING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "booking_id",
        aliases: &[],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "customer_id",
        aliases: &[],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "destination_city",
        aliases: &["to_city"],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "destination_country",
        aliases: &["to_country"],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "service_name",
        aliases: &[],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "device_type",
        aliases: &["device_type_used"],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "amount_inr",
        aliases: &["inr_amount"],
        kind: ColumnKind::Number,
        required: true,
    },
    ColumnSpec {
        canonical: "distance_km",
        aliases: &[],
        kind: ColumnKind::Number,
        required: true,
    },
    ColumnSpec {
        canonical: "days_to_departure",
        aliases: &[],
        kind: ColumnKind::Number,
        required: true,
    },
    ColumnSpec {
        canonical: "booking_time",
        aliases: &[],
        kind: ColumnKind::Timestamp,
        required: true,
    },
];

pub(crate) const SESSION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        canonical: "session_id",
        aliases: &[],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "search_id",
        aliases: &[],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "device_type",
        aliases: &["device_type_used"],
        kind: ColumnKind::Text,
        required: true,
    },
    ColumnSpec {
        canonical: "search_time",
        aliases: &[],
        kind: ColumnKind::Timestamp,
        required: true,
    },
];

/// Collapse a raw header into its comparable form: strip BOM and zero-width
/// characters, trim, fold case, and join inner whitespace with underscores.
pub(crate) fn normalize_header(raw: &str) -> String {
    let cleaned = raw.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    collapsed.to_ascii_lowercase()
}

static BOOKING_HEADER_MAP: OnceLock<HashMap<String, &'static ColumnSpec>> = OnceLock::new();
static SESSION_HEADER_MAP: OnceLock<HashMap<String, &'static ColumnSpec>> = OnceLock::new();

pub(crate) fn booking_spec_for_header(header: &str) -> Option<&'static ColumnSpec> {
    let map = BOOKING_HEADER_MAP.get_or_init(|| header_map(BOOKING_COLUMNS));
    map.get(&normalize_header(header)).copied()
}

pub(crate) fn session_spec_for_header(header: &str) -> Option<&'static ColumnSpec> {
    let map = SESSION_HEADER_MAP.get_or_init(|| header_map(SESSION_COLUMNS));
    map.get(&normalize_header(header)).copied()
}

fn header_map(specs: &'static [ColumnSpec]) -> HashMap<String, &'static ColumnSpec> {
    let mut map = HashMap::new();
    for spec in specs {
        map.insert(normalize_header(spec.canonical), spec);
        for alias in spec.aliases {
            map.insert(normalize_header(alias), spec);
        }
    }
    map
}
