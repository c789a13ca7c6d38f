//! Buyer-side reconciliation: Purchase Register vs GSTR2B.
//!
//! The join and classification logic is pure; `buyer_overview` only
//! fetches rows and delegates.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use gstwatch_store::collections::{
    ewaybills, gstr1, gstr2b, gstr3b, invoices, purchase_register, taxpayers,
};
use gstwatch_store::collections::gstr2b::Gstr2bRow;
use gstwatch_store::collections::gstr3b::Gstr3bRow;
use gstwatch_store::collections::purchase_register::PurchaseRow;
use gstwatch_store::collections::taxpayers::TaxpayerRow;
use gstwatch_store::value::round2;
use gstwatch_store::StorePool;

use crate::error::{ReconError, ReconResult};

/// Absolute tolerance for value comparison. Differences strictly
/// below this are rounding noise, not discrepancies.
pub const VALUE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    Matched,
    Mismatch,
    Missing,
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReconStatus::Matched => "MATCHED",
            ReconStatus::Mismatch => "MISMATCH",
            ReconStatus::Missing => "MISSING",
        })
    }
}

/// Classify one invoice by its presence and claimed value on each
/// side. A GSTR2B-only row reads as MATCHED: the buyer has not
/// claimed anything against it, so there is nothing to dispute yet.
pub fn classify(purchase_value: Option<f64>, gstr2b_value: Option<f64>) -> ReconStatus {
    match (purchase_value, gstr2b_value) {
        (Some(p), Some(g)) => {
            if (p - g).abs() < VALUE_TOLERANCE {
                ReconStatus::Matched
            } else {
                ReconStatus::Mismatch
            }
        }
        (Some(_), None) => ReconStatus::Missing,
        _ => ReconStatus::Matched,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconLine {
    pub invoice_id: String,
    pub seller_gstin: String,
    pub purchase_value: Option<f64>,
    pub gstr2b_value: Option<f64>,
    pub status: ReconStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingItc {
    pub invoice_id: String,
    pub seller_gstin: String,
    pub tax_claimed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItcSummary {
    pub total_invoices: usize,
    pub total_itc: f64,
    pub eligible_itc: f64,
    pub blocked_itc: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilingStatus {
    pub seller_gstin: String,
    pub gstr1_status: String,
    /// "YES" / "NO"
    pub gstr3b_payment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorRisk {
    pub gstin: String,
    pub name: String,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentWarning {
    pub invoice_id: String,
    /// "CRITICAL" / "WARNING"
    pub severity: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyerOverview {
    pub taxpayer: TaxpayerRow,
    pub itc_summary: ItcSummary,
    pub reconciliation: Vec<ReconLine>,
    pub missing_itc: Vec<MissingItc>,
    pub filing_status: Vec<FilingStatus>,
    pub vendor_risk: Vec<VendorRisk>,
    pub payment_warnings: Vec<PaymentWarning>,
}

/// ITC totals from the buyer's GSTR2B rows. Accumulated at full
/// precision; rounded to 2 decimals at the edge.
pub fn itc_summary(purchase_count: usize, gstr2b_rows: &[Gstr2bRow]) -> ItcSummary {
    let total: f64 = gstr2b_rows.iter().map(|r| r.tax).sum();
    let eligible: f64 = gstr2b_rows
        .iter()
        .filter(|r| r.itc_eligible == "YES")
        .map(|r| r.tax)
        .sum();
    let blocked: f64 = gstr2b_rows
        .iter()
        .filter(|r| r.itc_eligible == "NO")
        .map(|r| r.tax)
        .sum();
    ItcSummary {
        total_invoices: purchase_count,
        total_itc: round2(total),
        eligible_itc: round2(eligible),
        blocked_itc: round2(blocked),
    }
}

/// Join purchase register and GSTR2B over the union of invoice ids.
/// `seller_by_invoice` supplies the Invoices-collection fallback for
/// rows whose GSTR2B side carries no seller.
pub fn build_reconciliation(
    purchases: &[PurchaseRow],
    gstr2b_rows: &[Gstr2bRow],
    seller_by_invoice: &HashMap<String, String>,
) -> (Vec<ReconLine>, Vec<MissingItc>) {
    let pr_map: HashMap<&str, &PurchaseRow> =
        purchases.iter().map(|r| (r.invoice_id.as_str(), r)).collect();
    let g2b_map: HashMap<&str, &Gstr2bRow> =
        gstr2b_rows.iter().map(|r| (r.invoice_id.as_str(), r)).collect();

    let all_ids: BTreeSet<&str> = pr_map.keys().chain(g2b_map.keys()).copied().collect();

    let mut lines = Vec::with_capacity(all_ids.len());
    let mut missing = Vec::new();
    for inv_id in all_ids {
        let pr = pr_map.get(inv_id);
        let g2b = g2b_map.get(inv_id);

        let seller = g2b
            .map(|r| r.seller_gstin.as_str())
            .filter(|s| !s.is_empty())
            .or_else(|| seller_by_invoice.get(inv_id).map(String::as_str))
            .unwrap_or("N/A")
            .to_string();

        let purchase_value = pr.map(|r| r.value_claimed);
        let gstr2b_value = g2b.map(|r| r.value);
        let status = classify(purchase_value, gstr2b_value);

        if status == ReconStatus::Missing {
            if let Some(pr) = pr {
                missing.push(MissingItc {
                    invoice_id: inv_id.to_string(),
                    seller_gstin: seller.clone(),
                    tax_claimed: pr.tax_claimed,
                });
            }
        }

        lines.push(ReconLine {
            invoice_id: inv_id.to_string(),
            seller_gstin: seller,
            purchase_value,
            gstr2b_value,
            status,
        });
    }
    (lines, missing)
}

/// Risk assessment for one seller from the buyer's vantage point.
/// Returns None when nothing is wrong (LOW sellers are not listed).
pub fn assess_vendor(
    gstin: &str,
    name: &str,
    itc_blocked: bool,
    gstr1_filed_to_buyer: bool,
    payment_confirmed: bool,
    missing_ewaybills: &[String],
) -> Option<VendorRisk> {
    let mut reasons = Vec::new();
    let mut level = None;

    if itc_blocked {
        reasons.push("ITC blocked for one or more invoices".to_string());
        level = Some(RiskLevel::High);
    }
    if gstr1_filed_to_buyer && !payment_confirmed {
        reasons.push("GSTR1 filed but GSTR3B payment not confirmed".to_string());
        level = Some(RiskLevel::High);
    }
    if !missing_ewaybills.is_empty() {
        reasons.push(format!("Missing e-way bill for: {}", missing_ewaybills.join(", ")));
        level.get_or_insert(RiskLevel::Medium);
    }

    level.map(|risk_level| VendorRisk {
        gstin: gstin.to_string(),
        name: name.to_string(),
        risk_level,
        reasons,
    })
}

/// CRITICAL: purchase claims with no GSTR2B backing. WARNING: ITC
/// blocked by the supplier's filing state.
pub fn payment_warnings(
    purchases: &[PurchaseRow],
    gstr2b_rows: &[Gstr2bRow],
) -> Vec<PaymentWarning> {
    let g2b_ids: BTreeSet<&str> = gstr2b_rows.iter().map(|r| r.invoice_id.as_str()).collect();

    let mut warnings = Vec::new();
    for pr in purchases {
        if !g2b_ids.contains(pr.invoice_id.as_str()) {
            warnings.push(PaymentWarning {
                invoice_id: pr.invoice_id.clone(),
                severity: "CRITICAL".to_string(),
                message: format!(
                    "Do not release payment for invoice {} - tax link not found in GSTR2B",
                    pr.invoice_id
                ),
            });
        }
    }
    for g2b in gstr2b_rows {
        if g2b.itc_eligible == "NO" {
            warnings.push(PaymentWarning {
                invoice_id: g2b.invoice_id.clone(),
                severity: "WARNING".to_string(),
                message: format!(
                    "Invoice {} ITC blocked due to supplier filing delay",
                    g2b.invoice_id
                ),
            });
        }
    }
    warnings
}

/// Full buyer-perspective reconciliation dataset for one GSTIN.
pub async fn buyer_overview(store: &StorePool, gstin: &str) -> ReconResult<BuyerOverview> {
    let taxpayer = taxpayers::get(store, gstin)
        .await?
        .ok_or_else(|| ReconError::NotFound(format!("Taxpayer {gstin}")))?;

    let purchases = purchase_register::find_by_buyer(store, gstin).await?;
    let g2b_rows = gstr2b::find_by_buyer(store, gstin).await?;

    let all_invoices = invoices::list(store).await?;
    let seller_by_invoice: HashMap<String, String> = all_invoices
        .iter()
        .map(|i| (i.invoice_id.clone(), i.seller_gstin.clone()))
        .collect();

    let (reconciliation, missing_itc) =
        build_reconciliation(&purchases, &g2b_rows, &seller_by_invoice);

    // Sellers this buyer bought from, via either statement.
    let mut sellers: BTreeSet<String> = g2b_rows
        .iter()
        .filter(|r| !r.seller_gstin.is_empty())
        .map(|r| r.seller_gstin.clone())
        .collect();
    for pr in &purchases {
        if let Some(sg) = seller_by_invoice.get(&pr.invoice_id) {
            sellers.insert(sg.clone());
        }
    }

    let gstr1_rows = gstr1::list(store).await?;
    let gstr3b_rows = gstr3b::list(store).await?;
    let ewaybill_ids: BTreeSet<String> = ewaybills::list(store)
        .await?
        .into_iter()
        .map(|e| e.invoice_id)
        .collect();
    let taxpayer_rows = taxpayers::list(store).await?;
    let name_by_gstin: HashMap<&str, &str> = taxpayer_rows
        .iter()
        .map(|t| (t.gstin.as_str(), t.name.as_str()))
        .collect();

    let gstr3b_by_seller: HashMap<&str, Vec<&Gstr3bRow>> = {
        let mut map: HashMap<&str, Vec<&Gstr3bRow>> = HashMap::new();
        for r in &gstr3b_rows {
            map.entry(r.seller_gstin.as_str()).or_default().push(r);
        }
        map
    };

    let mut filing_status = Vec::with_capacity(sellers.len());
    let mut vendor_risk = Vec::new();
    for sg in &sellers {
        let gstr1_to_buyer = gstr1_rows
            .iter()
            .find(|r| r.seller_gstin == *sg && r.buyer_gstin == gstin);
        let seller_3b = gstr3b_by_seller.get(sg.as_str());
        let payment_confirmed = seller_3b
            .map(|rows| rows.iter().any(|r| r.is_paid()))
            .unwrap_or(false);

        filing_status.push(FilingStatus {
            seller_gstin: sg.clone(),
            gstr1_status: gstr1_to_buyer
                .map(|r| r.status.clone())
                .unwrap_or_else(|| "NOT FILED".to_string()),
            gstr3b_payment: (if payment_confirmed { "YES" } else { "NO" }).to_string(),
        });

        let itc_blocked = g2b_rows
            .iter()
            .any(|r| r.seller_gstin == *sg && r.itc_eligible == "NO");
        let missing_ewb: Vec<String> = reconciliation
            .iter()
            .filter(|l| l.seller_gstin == *sg && !ewaybill_ids.contains(&l.invoice_id))
            .map(|l| l.invoice_id.clone())
            .collect();

        if let Some(risk) = assess_vendor(
            sg,
            name_by_gstin.get(sg.as_str()).copied().unwrap_or("Unknown"),
            itc_blocked,
            gstr1_to_buyer.is_some(),
            payment_confirmed,
            &missing_ewb,
        ) {
            vendor_risk.push(risk);
        }
    }
    vendor_risk.sort_by(|a, b| a.risk_level.cmp(&b.risk_level).then(a.gstin.cmp(&b.gstin)));

    let warnings = payment_warnings(&purchases, &g2b_rows);

    Ok(BuyerOverview {
        itc_summary: itc_summary(purchases.len(), &g2b_rows),
        taxpayer,
        reconciliation,
        missing_itc,
        filing_status,
        vendor_risk,
        payment_warnings: warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(invoice_id: &str, value: f64, tax: f64) -> PurchaseRow {
        PurchaseRow {
            buyer_gstin: "B1".to_string(),
            invoice_id: invoice_id.to_string(),
            value_claimed: value,
            tax_claimed: tax,
            claim_date: "2026-02-01".to_string(),
        }
    }

    fn g2b(invoice_id: &str, seller: &str, value: f64, eligible: &str) -> Gstr2bRow {
        Gstr2bRow {
            invoice_id: invoice_id.to_string(),
            buyer_gstin: "B1".to_string(),
            seller_gstin: seller.to_string(),
            itc_eligible: eligible.to_string(),
            value,
            tax: value * 0.18,
        }
    }

    #[test]
    fn classify_tolerance_is_strict() {
        assert_eq!(classify(Some(1000.0), Some(1000.0)), ReconStatus::Matched);
        assert_eq!(classify(Some(1000.0), Some(1000.0099)), ReconStatus::Matched);
        // a difference of 0.01 or more is a mismatch
        assert_eq!(classify(Some(0.0), Some(0.01)), ReconStatus::Mismatch);
        assert_eq!(classify(Some(1000.0), Some(1000.5)), ReconStatus::Mismatch);
    }

    #[test]
    fn classify_partitions_by_presence() {
        assert_eq!(classify(Some(500.0), None), ReconStatus::Missing);
        assert_eq!(classify(None, Some(500.0)), ReconStatus::Matched);
    }

    #[test]
    fn reconciliation_covers_union_of_invoices() {
        // INV-1 on both sides matched, INV-2 claimed but absent from
        // GSTR2B, INV-3 reported but never claimed.
        let purchases = vec![pr("INV-1", 1000.0, 180.0), pr("INV-2", 2000.0, 360.0)];
        let g2b_rows = vec![
            g2b("INV-1", "S1", 1000.0, "YES"),
            g2b("INV-3", "S2", 750.0, "YES"),
        ];
        let sellers: HashMap<String, String> =
            [("INV-2".to_string(), "S9".to_string())].into();

        let (lines, missing) = build_reconciliation(&purchases, &g2b_rows, &sellers);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].status, ReconStatus::Matched);
        assert_eq!(lines[1].status, ReconStatus::Missing);
        assert_eq!(lines[1].seller_gstin, "S9");
        assert_eq!(lines[2].status, ReconStatus::Matched);

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].invoice_id, "INV-2");
        assert_eq!(missing[0].tax_claimed, 360.0);
    }

    #[test]
    fn reconciliation_flags_value_disagreement() {
        let purchases = vec![pr("INV-1", 1000.0, 180.0)];
        let g2b_rows = vec![g2b("INV-1", "S1", 999.0, "YES")];
        let (lines, missing) = build_reconciliation(&purchases, &g2b_rows, &HashMap::new());
        assert_eq!(lines[0].status, ReconStatus::Mismatch);
        assert!(missing.is_empty());
    }

    #[test]
    fn itc_summary_splits_by_eligibility() {
        let g2b_rows = vec![
            g2b("INV-1", "S1", 1000.0, "YES"),
            g2b("INV-2", "S1", 2000.0, "NO"),
            g2b("INV-3", "S2", 3000.0, "YES"),
        ];
        let summary = itc_summary(2, &g2b_rows);
        assert_eq!(summary.total_invoices, 2);
        assert_eq!(summary.total_itc, round2(6000.0 * 0.18));
        assert_eq!(summary.eligible_itc, round2(4000.0 * 0.18));
        assert_eq!(summary.blocked_itc, round2(2000.0 * 0.18));
    }

    #[test]
    fn assess_vendor_accumulates_reasons() {
        let risk = assess_vendor("S1", "Acme", true, true, false, &["INV-9".to_string()])
            .unwrap();
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.reasons.len(), 3);
    }

    #[test]
    fn assess_vendor_missing_ewaybill_alone_is_medium() {
        let risk = assess_vendor("S1", "Acme", false, false, true, &["INV-9".to_string()])
            .unwrap();
        assert_eq!(risk.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn assess_vendor_clean_seller_is_omitted() {
        assert!(assess_vendor("S1", "Acme", false, true, true, &[]).is_none());
        assert!(assess_vendor("S1", "Acme", false, false, true, &[]).is_none());
    }

    #[test]
    fn payment_warnings_severity() {
        let purchases = vec![pr("INV-1", 1000.0, 180.0), pr("INV-2", 2000.0, 360.0)];
        let g2b_rows = vec![g2b("INV-1", "S1", 1000.0, "NO")];

        let warnings = payment_warnings(&purchases, &g2b_rows);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].invoice_id, "INV-2");
        assert_eq!(warnings[0].severity, "CRITICAL");
        assert_eq!(warnings[1].invoice_id, "INV-1");
        assert_eq!(warnings[1].severity, "WARNING");
    }

    #[test]
    fn risk_levels_order_high_first() {
        let mut risks = vec![
            assess_vendor("S2", "", false, false, true, &["I".to_string()]).unwrap(),
            assess_vendor("S1", "", true, false, true, &[]).unwrap(),
        ];
        risks.sort_by(|a, b| a.risk_level.cmp(&b.risk_level).then(a.gstin.cmp(&b.gstin)));
        assert_eq!(risks[0].gstin, "S1");
        assert_eq!(risks[0].risk_level, RiskLevel::High);
    }
}
