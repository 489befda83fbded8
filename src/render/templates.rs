//! HTML templates for bills.
//!
//! All dynamic content goes through maud, which escapes it.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::envelope::document::{Amount, Bill, Party, Payment, Totals};
use crate::envelope::Envelope;
use crate::render::assets::{self, MAIN_STYLESHEET};
use crate::render::i18n::{t, Label};
use crate::render::options::{Locale, RenderOptions};

/// Which bill template to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillKind {
    Invoice,
    Order,
}

impl BillKind {
    fn title(self) -> Label {
        match self {
            BillKind::Invoice => Label::Invoice,
            BillKind::Order => Label::Order,
        }
    }
}

/// Render a complete HTML page for a bill.
pub fn bill_page(env: &Envelope, kind: BillKind, bill: &Bill, opts: &RenderOptions) -> Markup {
    let locale = opts.locale();
    let title = match bill.reference() {
        Some(reference) => format!("{} {}", t(locale, kind.title()), reference),
        None => t(locale, kind.title()).to_string(),
    };

    html! {
        (DOCTYPE)
        html lang=(locale.code()) {
            head {
                meta charset="utf-8";
                title { (title) }
                (stylesheets(opts))
            }
            body class={ "layout-" (opts.layout.as_str()) } {
                @if env.is_draft() {
                    div.watermark { (t(locale, Label::Draft)) }
                }
                article.document {
                    header {
                        div {
                            h1 { (t(locale, kind.title())) }
                            @if let Some(bill_type) = &bill.kind {
                                @if bill_type != "standard" {
                                    p.bill-type { (bill_type) }
                                }
                            }
                        }
                        dl.meta {
                            @if let Some(reference) = bill.reference() {
                                dt { (t(locale, Label::Code)) }
                                dd { (reference) }
                            }
                            dt { (t(locale, Label::IssueDate)) }
                            dd { (bill.issue_date.as_str()) }
                            @if let Some(op_date) = &bill.op_date {
                                dt { (t(locale, Label::OperationDate)) }
                                dd { (op_date.as_str()) }
                            }
                        }
                    }
                    div.parties {
                        (party(locale, Label::Supplier, &bill.supplier))
                        @if let Some(customer) = &bill.customer {
                            (party(locale, Label::Customer, customer))
                        }
                    }
                    (lines(locale, bill))
                    (totals(locale, &bill.currency, &bill.totals))
                    @if let Some(payment) = &bill.payment {
                        (payment_block(locale, &bill.currency, payment))
                    }
                    @if !bill.notes.is_empty() {
                        section.notes {
                            h2 { (t(locale, Label::Notes)) }
                            @for note in &bill.notes {
                                p { (note.text) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn stylesheets(opts: &RenderOptions) -> Markup {
    let names = [MAIN_STYLESHEET, opts.layout.stylesheet()];
    html! {
        @for name in names {
            @if opts.embed_stylesheets {
                @if let Some(css) = assets::stylesheet(name) {
                    style { (PreEscaped(css)) }
                }
            } @else {
                link rel="stylesheet" href={ "/styles/" (name) };
            }
        }
    }
}

fn party(locale: Locale, label: Label, party: &Party) -> Markup {
    html! {
        section {
            h2 { (t(locale, label)) }
            div.party-name { (party.name) }
            @if let Some(alias) = &party.alias {
                div.party-alias { (alias) }
            }
            @if let Some(tax_id) = &party.tax_id {
                div.party-tax-id { (t(locale, Label::TaxId)) ": " (tax_id.to_string()) }
            }
            @for address in &party.addresses {
                address {
                    @for line in address.lines() {
                        (line) br;
                    }
                }
            }
            @for email in &party.emails {
                div.party-email { (email.addr) }
            }
            @for phone in &party.telephones {
                div.party-phone { (phone.num) }
            }
        }
    }
}

fn lines(locale: Locale, bill: &Bill) -> Markup {
    let with_discounts = bill.lines.iter().any(|l| !l.discounts.is_empty());
    html! {
        table.lines {
            thead {
                tr {
                    th { "#" }
                    th { (t(locale, Label::Item)) }
                    th.num { (t(locale, Label::Quantity)) }
                    th.num { (t(locale, Label::Price)) }
                    @if with_discounts {
                        th.num { (t(locale, Label::Discount)) }
                    }
                    th { (t(locale, Label::Taxes)) }
                    th.num { (t(locale, Label::Total)) }
                }
            }
            tbody {
                @for line in &bill.lines {
                    tr {
                        td { (line.i) }
                        td {
                            (line.item.name)
                            @if let Some(unit) = &line.item.unit {
                                " (" (unit) ")"
                            }
                        }
                        td.num { (line.quantity.as_str()) }
                        td.num { (line.item.price.as_str()) }
                        @if with_discounts {
                            td.num {
                                @for discount in &line.discounts {
                                    div {
                                        @if let Some(percent) = &discount.percent {
                                            (percent) " "
                                        }
                                        (discount.amount.as_str())
                                    }
                                }
                            }
                        }
                        td {
                            @for tax in &line.taxes {
                                div { (tax.to_string()) }
                            }
                        }
                        td.num { (line.total.as_str()) }
                    }
                }
            }
        }
    }
}

fn money_row(label: &str, currency: &str, amount: &Amount, class: Option<&str>) -> Markup {
    html! {
        tr class=[class] {
            th { (label) }
            td { (amount.as_str()) " " (currency) }
        }
    }
}

fn totals(locale: Locale, currency: &str, totals: &Totals) -> Markup {
    html! {
        table.totals {
            (money_row(t(locale, Label::Sum), currency, &totals.sum, None))
            @if let Some(discount) = totals.discount.as_ref().filter(|d| !d.is_zero()) {
                (money_row(t(locale, Label::Discount), currency, discount, None))
            }
            @if let Some(charge) = &totals.charge {
                (money_row(t(locale, Label::Charge), currency, charge, None))
            }
            (money_row(t(locale, Label::Total), currency, &totals.total, None))
            @if let Some(taxes) = &totals.taxes {
                @for category in &taxes.categories {
                    @for rate in &category.rates {
                        tr {
                            th {
                                (category.code)
                                @if let Some(percent) = &rate.percent {
                                    " " (percent)
                                }
                                " (" (rate.base.as_str()) ")"
                            }
                            td { (rate.amount.as_str()) " " (currency) }
                        }
                    }
                }
            }
            @if let Some(tax) = &totals.tax {
                (money_row(t(locale, Label::Tax), currency, tax, None))
            }
            (money_row(t(locale, Label::TotalWithTax), currency, &totals.total_with_tax, None))
            @if let Some(advance) = &totals.advance {
                (money_row(t(locale, Label::Advance), currency, advance, None))
            }
            (money_row(t(locale, Label::Payable), currency, &totals.payable, Some("payable")))
            @if let Some(due) = &totals.due {
                (money_row(t(locale, Label::Due), currency, due, None))
            }
        }
    }
}

fn payment_block(locale: Locale, currency: &str, payment: &Payment) -> Markup {
    html! {
        section.payment {
            h2 { (t(locale, Label::Payment)) }
            @if let Some(terms) = &payment.terms {
                @if let Some(notes) = &terms.notes {
                    p { (notes) }
                }
                @for due in &terms.due_dates {
                    p { (t(locale, Label::DueDate)) ": " (due.date.as_str()) " · " (due.amount.as_str()) " " (currency) }
                }
            }
            @if let Some(instructions) = &payment.instructions {
                @if let Some(detail) = &instructions.detail {
                    p { (detail) }
                }
                @for transfer in &instructions.credit_transfer {
                    p.credit-transfer {
                        (t(locale, Label::BankTransfer)) ": "
                        @if let Some(name) = &transfer.name {
                            (name) " "
                        }
                        @if let Some(iban) = &transfer.iban {
                            (iban)
                        }
                        @if let Some(bic) = &transfer.bic {
                            " (" (bic) ")"
                        }
                    }
                }
            }
        }
    }
}
