//! Label translations.

use crate::render::options::Locale;

/// Every piece of fixed text printed on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Invoice,
    Order,
    Draft,
    Code,
    IssueDate,
    OperationDate,
    Supplier,
    Customer,
    TaxId,
    Item,
    Quantity,
    Price,
    Discount,
    Taxes,
    Total,
    Sum,
    Charge,
    Tax,
    TotalWithTax,
    Advance,
    Payable,
    Due,
    Payment,
    DueDate,
    BankTransfer,
    Notes,
}

/// Translate a label.
pub fn t(locale: Locale, label: Label) -> &'static str {
    match locale {
        Locale::En => en(label),
        Locale::Es => es(label),
    }
}

fn en(label: Label) -> &'static str {
    match label {
        Label::Invoice => "Invoice",
        Label::Order => "Order",
        Label::Draft => "Draft",
        Label::Code => "Code",
        Label::IssueDate => "Issue date",
        Label::OperationDate => "Operation date",
        Label::Supplier => "Supplier",
        Label::Customer => "Customer",
        Label::TaxId => "Tax ID",
        Label::Item => "Item",
        Label::Quantity => "Qty",
        Label::Price => "Price",
        Label::Discount => "Discount",
        Label::Taxes => "Taxes",
        Label::Total => "Total",
        Label::Sum => "Sum",
        Label::Charge => "Charges",
        Label::Tax => "Tax",
        Label::TotalWithTax => "Total with tax",
        Label::Advance => "Advance",
        Label::Payable => "Payable",
        Label::Due => "Due",
        Label::Payment => "Payment",
        Label::DueDate => "Due date",
        Label::BankTransfer => "Bank transfer",
        Label::Notes => "Notes",
    }
}

fn es(label: Label) -> &'static str {
    match label {
        Label::Invoice => "Factura",
        Label::Order => "Pedido",
        Label::Draft => "Borrador",
        Label::Code => "Código",
        Label::IssueDate => "Fecha de emisión",
        Label::OperationDate => "Fecha de operación",
        Label::Supplier => "Proveedor",
        Label::Customer => "Cliente",
        Label::TaxId => "NIF",
        Label::Item => "Concepto",
        Label::Quantity => "Cant.",
        Label::Price => "Precio",
        Label::Discount => "Descuento",
        Label::Taxes => "Impuestos",
        Label::Total => "Total",
        Label::Sum => "Suma",
        Label::Charge => "Cargos",
        Label::Tax => "Impuestos",
        Label::TotalWithTax => "Total con impuestos",
        Label::Advance => "Anticipo",
        Label::Payable => "A pagar",
        Label::Due => "Pendiente",
        Label::Payment => "Pago",
        Label::DueDate => "Vencimiento",
        Label::BankTransfer => "Transferencia bancaria",
        Label::Notes => "Notas",
    }
}
