//! Inspector-grade global queries across every taxpayer.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::warn;

use gstwatch_graph::queries::fraud::{detect_circles, find_shadow_networks, TradingCycle};
use gstwatch_graph::queries::risk::{risk_score, RiskProfile};
use gstwatch_graph::GraphClient;
use gstwatch_store::collections::invoices::InvoiceRow;
use gstwatch_store::collections::taxpayers::TaxpayerRow;
use gstwatch_store::collections::{
    self, ewaybills, gstr1, gstr2b, gstr3b, invoices, purchase_register, taxpayers, Collection,
};
use gstwatch_store::value::round2;
use gstwatch_store::StorePool;

use crate::error::{ReconError, ReconResult};

/// Invoice value above which an e-way bill is mandatory.
pub const EWAYBILL_VALUE_THRESHOLD: f64 = 50_000.0;

#[derive(Debug, Clone, Serialize)]
pub struct GlobalSummary {
    pub total_taxpayers: usize,
    pub total_invoices: usize,
    pub total_itc_claimed: f64,
    pub high_risk_vendors: usize,
}

pub async fn global_summary(store: &StorePool) -> ReconResult<GlobalSummary> {
    let total_taxpayers = collections::count(store, Collection::Taxpayers).await?;
    let total_invoices = collections::count(store, Collection::Invoices).await?;
    let total_itc: f64 = gstr2b::list(store).await?.iter().map(|r| r.tax).sum();
    let high_risk = taxpayers::count_high_risk(store).await?;

    Ok(GlobalSummary {
        total_taxpayers,
        total_invoices,
        total_itc_claimed: round2(total_itc),
        high_risk_vendors: high_risk,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct HighRiskVendor {
    pub gstin: String,
    pub name: String,
    pub risk_level: String,
    pub reasons: Vec<String>,
}

/// Union of four independent conditions. Store-side conditions always
/// run; graph-side conditions (shared IP, circular trading) are
/// skipped with a warning when the graph is unreachable so the list
/// still comes back.
pub async fn high_risk_vendors(
    store: &StorePool,
    graph: &GraphClient,
) -> ReconResult<Vec<HighRiskVendor>> {
    let mut reasons_by_gstin: BTreeMap<String, Vec<String>> = BTreeMap::new();

    // 1. GSTR1 filed but no payment-confirmed GSTR3B row.
    let gstr1_sellers: BTreeSet<String> = gstr1::list(store)
        .await?
        .into_iter()
        .map(|r| r.seller_gstin)
        .collect();
    let unpaid_sellers: BTreeSet<String> = gstr3b::list(store)
        .await?
        .into_iter()
        .filter(|r| !r.is_paid())
        .map(|r| r.seller_gstin)
        .collect();
    for sg in gstr1_sellers.intersection(&unpaid_sellers) {
        reasons_by_gstin
            .entry(sg.clone())
            .or_default()
            .push("GSTR1 filed but GSTR3B payment not confirmed".to_string());
    }

    // 2. Any ITC-blocked GSTR2B row attributed to the seller.
    let mut blocked_count: BTreeMap<String, usize> = BTreeMap::new();
    for row in gstr2b::list(store).await? {
        if row.itc_eligible == "NO" && !row.seller_gstin.is_empty() {
            *blocked_count.entry(row.seller_gstin).or_default() += 1;
        }
    }
    for (sg, count) in blocked_count {
        reasons_by_gstin
            .entry(sg)
            .or_default()
            .push(format!("ITC blocked on {count} invoice(s)"));
    }

    // 3. Shared IP address clusters.
    match find_shadow_networks(graph).await {
        Ok(clusters) => {
            for cluster in clusters.iter().filter(|c| c.match_type == "IP_ADDRESS") {
                for member in &cluster.members {
                    reasons_by_gstin.entry(member.gstin.clone()).or_default().push(
                        format!(
                            "Shared IP {} ({} entities)",
                            cluster.shared_value,
                            cluster.members.len()
                        ),
                    );
                }
            }
        }
        Err(err) => warn!(error = %err, "shared-IP check skipped, graph unavailable"),
    }

    // 4. Circular trading participation.
    match detect_circles(graph).await {
        Ok(cycles) => {
            for gstin in TradingCycle::participants(&cycles) {
                reasons_by_gstin
                    .entry(gstin)
                    .or_default()
                    .push("Involved in circular trading".to_string());
            }
        }
        Err(err) => warn!(error = %err, "circular-trading check skipped, graph unavailable"),
    }

    let name_by_gstin: HashMap<String, String> = taxpayers::list(store)
        .await?
        .into_iter()
        .map(|t| (t.gstin, t.name))
        .collect();

    let mut vendors: Vec<HighRiskVendor> = reasons_by_gstin
        .into_iter()
        .map(|(gstin, reasons)| HighRiskVendor {
            name: name_by_gstin
                .get(&gstin)
                .cloned()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            gstin,
            risk_level: "HIGH".to_string(),
            reasons,
        })
        .collect();
    sort_by_reason_count(&mut vendors);
    Ok(vendors)
}

fn sort_by_reason_count(vendors: &mut [HighRiskVendor]) {
    vendors.sort_by(|a, b| {
        b.reasons
            .len()
            .cmp(&a.reasons.len())
            .then(a.gstin.cmp(&b.gstin))
    });
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    pub gstin: String,
    pub name: String,
    pub gstr1_filed: bool,
    pub tax_paid: bool,
    pub compliant: bool,
}

/// Per-taxpayer GSTR1 vs GSTR3B compliance. Non-compliant rows
/// first, then ascending GSTIN.
pub async fn compliance_table(store: &StorePool) -> ReconResult<Vec<ComplianceRow>> {
    let gstr1_sellers: BTreeSet<String> = gstr1::list(store)
        .await?
        .into_iter()
        .map(|r| r.seller_gstin)
        .collect();
    let paid_sellers: BTreeSet<String> = gstr3b::list(store)
        .await?
        .into_iter()
        .filter(|r| r.is_paid())
        .map(|r| r.seller_gstin)
        .collect();

    let mut rows: Vec<ComplianceRow> = taxpayers::list(store)
        .await?
        .into_iter()
        .map(|t| {
            let filed = gstr1_sellers.contains(&t.gstin);
            let paid = paid_sellers.contains(&t.gstin);
            ComplianceRow {
                gstin: t.gstin,
                name: t.name,
                gstr1_filed: filed,
                tax_paid: paid,
                compliant: filed && paid,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.compliant.cmp(&b.compliant).then(a.gstin.cmp(&b.gstin)));
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct FakeItcSuspect {
    pub invoice_id: String,
    pub buyer_gstin: String,
    pub seller_gstin: String,
}

/// Purchase-register claims with no GSTR1 row anywhere: the buyer
/// claims credit on an invoice no seller ever declared.
pub async fn fake_itc_suspects(store: &StorePool) -> ReconResult<Vec<FakeItcSuspect>> {
    let declared: BTreeSet<String> = gstr1::list(store)
        .await?
        .into_iter()
        .map(|r| r.invoice_id)
        .collect();
    let seller_by_invoice: HashMap<String, String> = invoices::list(store)
        .await?
        .into_iter()
        .map(|i| (i.invoice_id, i.seller_gstin))
        .collect();

    let mut suspects: Vec<FakeItcSuspect> = purchase_register::list(store)
        .await?
        .into_iter()
        .filter(|pr| !declared.contains(&pr.invoice_id))
        .map(|pr| FakeItcSuspect {
            seller_gstin: seller_by_invoice
                .get(&pr.invoice_id)
                .cloned()
                .unwrap_or_else(|| "N/A".to_string()),
            invoice_id: pr.invoice_id,
            buyer_gstin: pr.buyer_gstin,
        })
        .collect();
    suspects.sort_by(|a, b| a.invoice_id.cmp(&b.invoice_id));
    Ok(suspects)
}

#[derive(Debug, Clone, Serialize)]
pub struct EwayBillSuspect {
    pub invoice_id: String,
    pub seller_gstin: String,
    pub buyer_gstin: String,
    pub value: f64,
}

/// High-value invoices moving without a transport document.
pub async fn ewaybill_fraud_suspects(store: &StorePool) -> ReconResult<Vec<EwayBillSuspect>> {
    let covered: BTreeSet<String> = ewaybills::list(store)
        .await?
        .into_iter()
        .map(|e| e.invoice_id)
        .collect();

    let mut suspects = flag_uncovered_invoices(&invoices::list(store).await?, &covered);
    suspects.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.invoice_id.cmp(&b.invoice_id))
    });
    Ok(suspects)
}

fn flag_uncovered_invoices(
    invoices: &[InvoiceRow],
    covered: &BTreeSet<String>,
) -> Vec<EwayBillSuspect> {
    invoices
        .iter()
        .filter(|i| i.value > EWAYBILL_VALUE_THRESHOLD && !covered.contains(&i.invoice_id))
        .map(|i| EwayBillSuspect {
            invoice_id: i.invoice_id.clone(),
            seller_gstin: i.seller_gstin.clone(),
            buyer_gstin: i.buyer_gstin.clone(),
            value: i.value,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GstinProfile {
    pub taxpayer: TaxpayerRow,
    pub invoices_as_seller: Vec<InvoiceRow>,
    pub invoices_as_buyer: Vec<InvoiceRow>,
    pub gstr1_filings: usize,
    pub gstr3b_filings: usize,
    pub gstr2b_claims: usize,
    pub risk: Option<RiskProfile>,
    pub risk_level: Option<String>,
    pub gstr1_filed: bool,
    pub payment_confirmed: bool,
    pub compliant: bool,
}

/// Score bands: 0-30 LOW, 31-60 MEDIUM, 61-100 HIGH.
pub fn classify_score(score: u32) -> &'static str {
    match score {
        0..=30 => "LOW",
        31..=60 => "MEDIUM",
        _ => "HIGH",
    }
}

/// Full single-GSTIN profile. The graph risk score is best-effort;
/// the rest of the profile does not depend on Neo4j being up.
pub async fn gstin_profile(
    store: &StorePool,
    graph: &GraphClient,
    gstin: &str,
) -> ReconResult<GstinProfile> {
    let taxpayer = taxpayers::get(store, gstin)
        .await?
        .ok_or_else(|| ReconError::NotFound(format!("Taxpayer {gstin}")))?;

    let sold = invoices::find_by_seller(store, gstin).await?;
    let bought = invoices::find_by_buyer(store, gstin).await?;
    let gstr1_rows = gstr1::find_by_seller(store, gstin).await?;
    let gstr3b_rows = gstr3b::find_by_seller(store, gstin).await?;
    let gstr2b_rows = gstr2b::find_by_buyer(store, gstin).await?;

    let risk = match risk_score(graph, gstin).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!(error = %err, gstin, "risk score skipped, graph unavailable");
            None
        }
    };
    let risk_level = risk.as_ref().map(|r| classify_score(r.risk_score).to_string());

    let gstr1_filed = !gstr1_rows.is_empty();
    let payment_confirmed = gstr3b_rows.iter().any(|r| r.is_paid());

    Ok(GstinProfile {
        taxpayer,
        invoices_as_seller: sold,
        invoices_as_buyer: bought,
        gstr1_filings: gstr1_rows.len(),
        gstr3b_filings: gstr3b_rows.len(),
        gstr2b_claims: gstr2b_rows.len(),
        risk,
        risk_level,
        gstr1_filed,
        payment_confirmed,
        compliant: gstr1_filed && payment_confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(id: &str, value: f64) -> InvoiceRow {
        InvoiceRow {
            invoice_id: id.to_string(),
            value,
            invoice_date: "2026-01-10".to_string(),
            seller_gstin: "S1".to_string(),
            buyer_gstin: "B1".to_string(),
        }
    }

    #[test]
    fn ewaybill_threshold_is_exclusive() {
        let covered = BTreeSet::new();
        let invoices = vec![
            inv("INV-1", 60_000.0),
            inv("INV-2", 50_000.0),
            inv("INV-3", 49_999.99),
        ];
        let suspects = flag_uncovered_invoices(&invoices, &covered);
        assert_eq!(suspects.len(), 1);
        assert_eq!(suspects[0].invoice_id, "INV-1");
    }

    #[test]
    fn covered_high_value_invoice_is_not_a_suspect() {
        let covered: BTreeSet<String> = ["INV-1".to_string()].into();
        let suspects = flag_uncovered_invoices(&[inv("INV-1", 60_000.0)], &covered);
        assert!(suspects.is_empty());
    }

    #[test]
    fn score_bands() {
        assert_eq!(classify_score(0), "LOW");
        assert_eq!(classify_score(30), "LOW");
        assert_eq!(classify_score(31), "MEDIUM");
        assert_eq!(classify_score(60), "MEDIUM");
        assert_eq!(classify_score(61), "HIGH");
        assert_eq!(classify_score(100), "HIGH");
    }

    #[test]
    fn high_risk_sort_orders_by_reason_count_then_gstin() {
        let mk = |gstin: &str, n: usize| HighRiskVendor {
            gstin: gstin.to_string(),
            name: String::new(),
            risk_level: "HIGH".to_string(),
            reasons: vec!["r".to_string(); n],
        };
        let mut vendors = vec![mk("G3", 1), mk("G2", 2), mk("G1", 1)];
        sort_by_reason_count(&mut vendors);
        let order: Vec<&str> = vendors.iter().map(|v| v.gstin.as_str()).collect();
        assert_eq!(order, vec!["G2", "G1", "G3"]);
    }
}
