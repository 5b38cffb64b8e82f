//! HTML pages.
//!
//! Markup is deliberately plain; every interpolated value goes through
//! [`escape_html`].

use std::fmt::Write;

use order_ledger_core::aggregate::Dashboard;
use order_ledger_core::persistence::OrderFile;
use order_ledger_core::{SizeCatalog, Variant};

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Ledger order form with one quantity input per variant and size.
pub fn order_form(catalog: &SizeCatalog, success: bool) -> String {
    let mut body = String::from("<h1>Pedido</h1>\n");
    if success {
        body.push_str("<p class=\"sucesso\">Pedido enviado com sucesso!</p>\n");
    }
    body.push_str("<form method=\"post\" action=\"/enviar\">\n");
    body.push_str("<label>Nome <input name=\"nome\" required></label>\n");
    body.push_str("<table>\n<tr><th>Tamanho</th>");
    for variant in Variant::ALL {
        let _ = write!(body, "<th>{}</th>", variant);
    }
    body.push_str("</tr>\n");
    for &size in catalog.sizes() {
        let _ = write!(body, "<tr><td>{}</td>", size);
        for variant in Variant::ALL {
            let _ = write!(
                body,
                "<td><input type=\"number\" name=\"{}\" value=\"0\"></td>",
                variant.field_name(size)
            );
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n<button type=\"submit\">Enviar</button>\n</form>\n");
    layout("Pedido", &body)
}

/// Single-item form: colour, size and quantity.
pub fn item_form(catalog: &SizeCatalog) -> String {
    let mut body = String::from("<h1>Pedido</h1>\n<form method=\"post\" action=\"/enviar\">\n");
    body.push_str("<label>Nome <input name=\"nome\" required></label>\n");
    body.push_str("<label>Cor <select name=\"cor\">");
    for variant in Variant::ALL {
        let _ = write!(
            body,
            "<option value=\"{}\">{}</option>",
            variant.field_prefix(),
            variant
        );
    }
    body.push_str("</select></label>\n<label>Tamanho <select name=\"tamanho\">");
    for &size in catalog.sizes() {
        let _ = write!(body, "<option value=\"{0}\">{0}</option>", size);
    }
    body.push_str("</select></label>\n");
    body.push_str(
        "<label>Quantidade <input type=\"number\" name=\"quantidade\" value=\"1\"></label>\n",
    );
    body.push_str("<button type=\"submit\">Enviar</button>\n</form>\n");
    layout("Pedido", &body)
}

/// Admin dashboard. `download_href` is omitted for the session-gated copy.
pub fn dashboard(dashboard: &Dashboard, download_href: Option<&str>) -> String {
    let mut body = String::from("<h1>Pedidos</h1>\n<ul class=\"totais\">\n");
    for variant in Variant::ALL {
        let _ = writeln!(
            body,
            "<li>Total {}: <strong>{}</strong></li>",
            variant,
            dashboard.total_for(variant)
        );
    }
    let _ = writeln!(
        body,
        "<li>Total de pedidos: <strong>{}</strong></li>\n</ul>",
        dashboard.order_count
    );
    if let Some(href) = download_href {
        let _ = writeln!(
            body,
            "<p><a href=\"{}\">Baixar planilha</a></p>",
            escape_html(href)
        );
    }

    if dashboard.orders.is_empty() {
        body.push_str("<p>Nenhum pedido ainda.</p>\n");
        return layout("Pedidos", &body);
    }

    body.push_str("<table>\n<tr><th>Data</th><th>Cliente</th>");
    for variant in Variant::ALL {
        let _ = write!(body, "<th>{}</th>", variant);
    }
    body.push_str("<th>Total</th></tr>\n");
    for order in &dashboard.orders {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td>",
            escape_html(&order.timestamp),
            escape_html(&order.customer_name)
        );
        for variant in Variant::ALL {
            let _ = write!(body, "<td>{}</td>", order.total_for(variant));
        }
        let _ = writeln!(body, "<td>{}</td></tr>", order.total_overall);
    }
    body.push_str("</table>\n");
    layout("Pedidos", &body)
}

/// Listing of per-customer order files.
pub fn order_files(files: &[OrderFile]) -> String {
    let mut body = String::from("<h1>Pedidos</h1>\n<p><a href=\"/logout\">Sair</a></p>\n");
    if files.is_empty() {
        body.push_str("<p>Nenhum pedido ainda.</p>\n");
        return layout("Pedidos", &body);
    }
    body.push_str(
        "<table>\n<tr><th>Data</th><th>Cliente</th><th>Cor</th><th>Tamanho</th>\
         <th>Quantidade</th><th>Arquivo</th></tr>\n",
    );
    for file in files {
        let link = format!(
            "<a href=\"/download/{0}\">{0}</a>",
            escape_html(&file.file_name)
        );
        match &file.order {
            Some(order) => {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&order.timestamp),
                    escape_html(&order.customer_name),
                    order.variant,
                    order.size,
                    order.quantity,
                    link
                );
            }
            None => {
                let _ = writeln!(
                    body,
                    "<tr><td colspan=\"5\">arquivo ilegível</td><td>{}</td></tr>",
                    link
                );
            }
        }
    }
    body.push_str("</table>\n");
    layout("Pedidos", &body)
}

pub fn login(failed: bool) -> String {
    let mut body = String::from("<h1>Área da empresa</h1>\n");
    if failed {
        body.push_str("<p class=\"erro\">Senha incorreta.</p>\n");
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
         <label>Senha <input type=\"password\" name=\"senha\"></label>\n\
         <button type=\"submit\">Entrar</button>\n</form>\n",
    );
    layout("Login", &body)
}
