//! Routing decision parsed from the classifier's reply.

/// Which tool(s) a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Inventory numbers, prices, counts. SQL tool only.
    Structured,
    /// Policies, rules, approvals. Retrieval tool only.
    Unstructured,
    /// Needs both, structured section first.
    Both,
    /// The reply named none of the permitted labels.
    Unknown,
}

impl Route {
    /// Parse a classifier reply by the labels it contains.
    ///
    /// The reply is split into alphanumeric words, case-insensitively; only
    /// whole words count, so `MYSQL` names nothing. `SQL`/`STRUCTURED` and
    /// `RAG`/`UNSTRUCTURED` select one tool each. `BOTH`, or labels for both
    /// tools, selects [`Route::Both`].
    pub fn parse(reply: &str) -> Self {
        let upper = reply.to_uppercase();
        let (mut structured, mut retrieval) = (false, false);
        for word in upper.split(|c: char| !c.is_alphanumeric()) {
            match word {
                "BOTH" => return Route::Both,
                "SQL" | "STRUCTURED" => structured = true,
                "RAG" | "UNSTRUCTURED" => retrieval = true,
                _ => {}
            }
        }

        match (structured, retrieval) {
            (true, true) => Route::Both,
            (true, false) => Route::Structured,
            (false, true) => Route::Unstructured,
            (false, false) => Route::Unknown,
        }
    }

    /// Whether the structured (SQL) tool runs for this route.
    pub fn uses_structured(self) -> bool {
        matches!(self, Route::Structured | Route::Both)
    }

    /// Whether the retrieval tool runs. Unknown falls back to retrieval alone.
    pub fn uses_retrieval(self) -> bool {
        matches!(self, Route::Unstructured | Route::Both | Route::Unknown)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Structured => write!(f, "STRUCTURED"),
            Route::Unstructured => write!(f, "UNSTRUCTURED"),
            Route::Both => write!(f, "BOTH"),
            Route::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(Route::parse("SQL"), Route::Structured);
        assert_eq!(Route::parse("structured"), Route::Structured);
        assert_eq!(Route::parse("RAG"), Route::Unstructured);
        assert_eq!(Route::parse("Unstructured"), Route::Unstructured);
        assert_eq!(Route::parse("BOTH"), Route::Both);
    }

    #[test]
    fn test_parse_tolerates_formatting() {
        assert_eq!(Route::parse("  both.\n"), Route::Both);
        assert_eq!(Route::parse("**SQL**"), Route::Structured);
        assert_eq!(Route::parse("**BOTH**."), Route::Both);
        assert_eq!(Route::parse("`rag`"), Route::Unstructured);
        assert_eq!(Route::parse("\"BOTH\""), Route::Both);
    }

    #[test]
    fn test_parse_finds_label_in_sentence() {
        assert_eq!(Route::parse("Category: BOTH"), Route::Both);
        assert_eq!(
            Route::parse("BOTH - needs inventory data AND policy information"),
            Route::Both
        );
        assert_eq!(Route::parse("I think SQL"), Route::Structured);
        assert_eq!(Route::parse("Answer: rag"), Route::Unstructured);
        assert_eq!(Route::parse("SQL or RAG"), Route::Both);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Route::parse(""), Route::Unknown);
        assert_eq!(Route::parse("MYSQL"), Route::Unknown);
        assert_eq!(Route::parse("I'm not sure"), Route::Unknown);
        assert_eq!(Route::parse("DRAGON"), Route::Unknown);
    }

    #[test]
    fn test_every_route_runs_a_tool() {
        for route in [Route::Structured, Route::Unstructured, Route::Both, Route::Unknown] {
            assert!(route.uses_structured() || route.uses_retrieval(), "{route}");
        }
        assert!(!Route::Unknown.uses_structured());
        assert!(Route::Unknown.uses_retrieval());
    }
}
