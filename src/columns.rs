/// Canonical column names, in export order
///
/// Every row of the unified table carries all of these, whether or not the
/// source sheet had a matching header.
pub const CANONICAL_COLUMNS: [&str; 11] = [
    "date",
    "tool",
    "used_by",
    "department",
    "amount",
    "company",
    "status",
    "cycle",
    "renewal",
    "receipt",
    "desc",
];

/// One header-matching rule: a predicate over the lower-cased header and the
/// canonical column it selects
pub struct ColumnRule {
    pub canonical: &'static str,
    pub matches: fn(&str) -> bool,
}

/// Header rules in priority order. The first rule that matches wins, so the
/// order decides ambiguous headers ("Renewal date" is `renewal`, "Service used
/// by" is `tool`).
pub const COLUMN_RULES: [ColumnRule; 11] = [
    ColumnRule {
        canonical: "date",
        matches: |h| h.contains("date") && (h.contains("purchase") || h == "date"),
    },
    ColumnRule {
        canonical: "tool",
        matches: |h| h.contains("tool") || h.contains("service"),
    },
    ColumnRule {
        canonical: "used_by",
        matches: |h| h.contains("use"),
    },
    ColumnRule {
        canonical: "department",
        matches: |h| h.contains("depart") || h.contains("dept"),
    },
    ColumnRule {
        canonical: "amount",
        matches: |h| h.contains("amount") || h.contains("amt"),
    },
    ColumnRule {
        canonical: "company",
        matches: |h| h.contains("company"),
    },
    ColumnRule {
        canonical: "status",
        matches: |h| h.contains("status"),
    },
    ColumnRule {
        canonical: "cycle",
        matches: |h| h.contains("cycle"),
    },
    ColumnRule {
        canonical: "renewal",
        matches: |h| h.contains("renew"),
    },
    ColumnRule {
        canonical: "receipt",
        matches: |h| h.contains("receipt"),
    },
    ColumnRule {
        canonical: "desc",
        matches: |h| h.contains("desc"),
    },
];

/// Map a raw header onto its canonical column
///
/// Returns the raw header unchanged when no rule matches.
///
/// # Examples
/// ```
/// use expense_dashboard::columns::canonical_name;
///
/// assert_eq!(canonical_name("Purchase Date"), "date");
/// assert_eq!(canonical_name("Amt (USD)"), "amount");
/// assert_eq!(canonical_name("Notes"), "Notes");
/// ```
pub fn canonical_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    COLUMN_RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.canonical.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Map every header of a sheet, keeping input order
pub fn column_map<S: AsRef<str>>(headers: &[S]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|h| (h.as_ref().to_string(), canonical_name(h.as_ref())))
        .collect()
}

/// Whether `name` is one of [`CANONICAL_COLUMNS`]
///
/// Used after [`canonical_name`] to tell a recognized header from one that
/// passed through unchanged.
///
/// # Examples
/// ```
/// use expense_dashboard::columns::is_canonical;
///
/// assert!(is_canonical("amount"));
/// assert!(!is_canonical("Currency"));
/// ```
pub fn is_canonical(name: &str) -> bool {
    CANONICAL_COLUMNS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_free_text_headers() {
        let headers = ["Purchase Date", "Service Used", "Dept", "Amt (USD)"];
        let mapped: Vec<String> = column_map(&headers).into_iter().map(|(_, c)| c).collect();
        assert_eq!(mapped, vec!["date", "tool", "department", "amount"]);
    }

    #[test]
    fn canonical_headers_map_to_themselves() {
        for name in CANONICAL_COLUMNS {
            assert_eq!(canonical_name(name), name);
        }
    }

    #[test]
    fn unknown_headers_pass_through() {
        assert_eq!(canonical_name("Currency"), "Currency");
        assert_eq!(canonical_name(""), "");
        assert!(!is_canonical("Currency"));
    }

    #[test]
    fn priority_order_resolves_ambiguous_headers() {
        // "use" is checked before "renew" and "date" only counts with "purchase"
        assert_eq!(canonical_name("Renewal Date"), "renewal");
        assert_eq!(canonical_name("Date used"), "used_by");
        assert_eq!(canonical_name("Service used by"), "tool");
        assert_eq!(canonical_name("Department Used"), "used_by");
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        assert_eq!(canonical_name("  DATE "), "date");
        assert_eq!(canonical_name("Payment STATUS"), "status");
        assert_eq!(canonical_name("Billing Cycle"), "cycle");
        assert_eq!(canonical_name("Description"), "desc");
        assert_eq!(canonical_name("Receipt Link"), "receipt");
        assert_eq!(canonical_name("Company Name"), "company");
    }
}
