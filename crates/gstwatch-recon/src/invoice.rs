//! Single-invoice drill-down from the buyer's perspective.

use serde::Serialize;

use gstwatch_store::collections::gstr2b::Gstr2bRow;
use gstwatch_store::collections::invoices::InvoiceRow;
use gstwatch_store::collections::purchase_register::PurchaseRow;
use gstwatch_store::collections::{gstr1, gstr2b, gstr3b, invoices, purchase_register};
use gstwatch_store::StorePool;

use crate::buyer::{classify, ReconStatus};
use crate::error::{ReconError, ReconResult};

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice_id: String,
    pub seller_gstin: String,
    pub status: ReconStatus,
    pub itc_eligible: String,
    pub gstr1_status: String,
    pub gstr3b_payment_confirmed: bool,
    pub purchase_register: Option<PurchaseRow>,
    pub gstr2b: Option<Gstr2bRow>,
    pub invoice: Option<InvoiceRow>,
    pub explanations: Vec<String>,
}

fn explain(
    invoice_id: &str,
    status: ReconStatus,
    itc_eligible: &str,
    payment_confirmed: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    match status {
        ReconStatus::Missing => out.push(format!(
            "Invoice {invoice_id} missing because supplier did not file GSTR1."
        )),
        ReconStatus::Mismatch => out.push(format!(
            "Invoice {invoice_id} mismatch because supplier reported a different value."
        )),
        ReconStatus::Matched => out.push(format!("Invoice {invoice_id} fully reconciled.")),
    }
    if itc_eligible == "NO" {
        out.push(format!(
            "Invoice {invoice_id} ITC blocked: marked ineligible in GSTR2B."
        ));
    }
    if !payment_confirmed {
        out.push(format!(
            "Invoice {invoice_id} risk: supplier GSTR3B payment not confirmed."
        ));
    }
    out
}

/// Single invoice with reconciliation status and plain-language
/// explanations.
///
/// Forbidden when the invoice exists but belongs to neither side of
/// the requesting GSTIN; NotFound when there is nothing under that
/// id for this buyer.
pub async fn invoice_detail(
    store: &StorePool,
    buyer_gstin: &str,
    invoice_id: &str,
) -> ReconResult<InvoiceDetail> {
    let purchase = purchase_register::find_one(store, buyer_gstin, invoice_id).await?;
    let g2b = gstr2b::find_by_invoice(store, invoice_id)
        .await?
        .filter(|r| r.buyer_gstin == buyer_gstin);
    let invoice = invoices::get(store, invoice_id).await?;

    if purchase.is_none() && g2b.is_none() {
        if let Some(inv) = &invoice {
            if inv.buyer_gstin != buyer_gstin && inv.seller_gstin != buyer_gstin {
                return Err(ReconError::Forbidden(format!(
                    "Invoice {invoice_id} does not belong to {buyer_gstin}"
                )));
            }
        }
        return Err(ReconError::NotFound(format!(
            "Invoice {invoice_id} for {buyer_gstin}"
        )));
    }

    let seller_gstin = g2b
        .as_ref()
        .map(|r| r.seller_gstin.clone())
        .filter(|s| !s.is_empty())
        .or_else(|| invoice.as_ref().map(|i| i.seller_gstin.clone()))
        .unwrap_or_else(|| "N/A".to_string());

    let status = classify(
        purchase.as_ref().map(|r| r.value_claimed),
        g2b.as_ref().map(|r| r.value),
    );

    let itc_eligible = g2b
        .as_ref()
        .map(|r| r.itc_eligible.clone())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let gstr1_status = gstr1::find_by_invoice(store, invoice_id)
        .await?
        .map(|r| r.status)
        .unwrap_or_else(|| "NOT FILED".to_string());

    let payment_confirmed = if seller_gstin != "N/A" {
        gstr3b::find_by_seller(store, &seller_gstin)
            .await?
            .iter()
            .any(|r| r.is_paid())
    } else {
        false
    };

    Ok(InvoiceDetail {
        invoice_id: invoice_id.to_string(),
        explanations: explain(invoice_id, status, &itc_eligible, payment_confirmed),
        seller_gstin,
        status,
        itc_eligible,
        gstr1_status,
        gstr3b_payment_confirmed: payment_confirmed,
        purchase_register: purchase,
        gstr2b: g2b,
        invoice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explanations_lead_with_status() {
        let lines = explain("INV-1", ReconStatus::Missing, "UNKNOWN", true);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("missing"));

        let lines = explain("INV-1", ReconStatus::Matched, "NO", false);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("fully reconciled"));
        assert!(lines[1].contains("ITC blocked"));
        assert!(lines[2].contains("payment not confirmed"));
    }
}
