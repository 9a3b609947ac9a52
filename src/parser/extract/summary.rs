const PURPOSES: &[(&str, &str)] = &[
    ("payment", "This clause deals with payment matters"),
    ("time", "This clause addresses time-related obligations"),
    ("completion", "This clause covers completion requirements"),
    ("defect", "This clause concerns defects and liability"),
    ("variation", "This clause handles variations to the contract"),
    ("claim", "This clause relates to claims and disputes"),
    ("termination", "This clause covers contract termination"),
    ("indemnity", "This clause involves indemnity provisions"),
    ("warranty", "This clause includes warranty obligations"),
];

const DEFAULT_PURPOSE: &str = "This clause sets out contractual obligations and requirements.";

const RISK_BUCKETS: &[(&str, &[&str])] = &[
    ("time", &["time", "delay", "extension", "deadline"]),
    ("cost", &["payment", "cost", "price", "expense"]),
    ("quality", &["defect", "quality", "standard", "comply"]),
    ("legal", &["liability", "indemnity", "claim", "dispute"]),
];

/// Plain-language summary: purpose, who owes what, and which kinds of risk
/// the wording touches.
pub fn summarize(text: &str) -> String {
    let lower = text.to_lowercase();
    let has = |k: &str| lower.contains(k);

    let purpose = PURPOSES
        .iter()
        .find(|(k, _)| has(*k))
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_PURPOSE);

    let mut contractor = Vec::new();
    if has("contractor shall") || has("contractor must") {
        contractor.push("Contractor has specific obligations");
    }
    if has("contractor may") || has("contractor is entitled") {
        contractor.push("Contractor has certain entitlements");
    }

    let mut employer = Vec::new();
    if has("employer shall") || has("employer must") {
        employer.push("Employer has specific obligations");
    }
    if has("employer may") {
        employer.push("Employer has certain rights");
    }

    let mut summary = format!("{purpose}\n\n");
    if !contractor.is_empty() {
        summary.push_str(&format!("Contractor obligations: {}.\n", contractor.join(", ")));
    }
    if !employer.is_empty() {
        summary.push_str(&format!("Employer obligations: {}.\n", employer.join(", ")));
    }

    let risk_types: Vec<&str> = RISK_BUCKETS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| has(*w)))
        .map(|(name, _)| *name)
        .collect();
    if !risk_types.is_empty() {
        summary.push_str(&format!("\nRisk types involved: {}.", risk_types.join(", ")));
    }

    summary.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_purpose_only() {
        assert_eq!(summarize("The Engineer shall inspect the Works."), DEFAULT_PURPOSE);
    }

    #[test]
    fn first_purpose_in_table_order_wins() {
        // mentions both claim and payment; payment is earlier in the table
        let s = summarize("A claim for payment.");
        assert!(s.starts_with("This clause deals with payment matters"));
    }

    #[test]
    fn full_summary() {
        let s = summarize(
            "The Contractor shall be entitled to an extension of time of 28 days if delayed.",
        );
        assert_eq!(
            s,
            "This clause addresses time-related obligations\n\n\
             Contractor obligations: Contractor has specific obligations.\n\n\
             Risk types involved: time."
        );
    }

    #[test]
    fn both_parties() {
        let s = summarize("The Employer may terminate. The Contractor may claim costs. The Employer shall pay.");
        assert!(s.contains("Contractor obligations: Contractor has certain entitlements."));
        assert!(s.contains("Employer obligations: Employer has specific obligations, Employer has certain rights."));
        assert!(s.ends_with("Risk types involved: cost, legal."));
    }

    #[test]
    fn never_empty() {
        assert!(!summarize("").is_empty());
    }
}
