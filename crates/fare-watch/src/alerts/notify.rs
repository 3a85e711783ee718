use rust_decimal::Decimal;

use super::domain::Alert;
use super::money::format_brl;
use crate::mail::EmailMessage;

const CONTEXT_STYLE: &str = "background-color: #e8f0fe; padding: 10px; border-radius: 8px;";
const BUTTON_STYLE: &str = "display: inline-block; padding: 12px 24px; margin: 20px 0; \
font-size: 16px; color: white; text-decoration: none; border-radius: 8px;";

fn context_paragraph(context: Option<&str>) -> String {
    match context {
        Some(sentence) => format!(r#"<p style="{CONTEXT_STYLE}">{sentence}</p>"#),
        None => String::new(),
    }
}

fn offer_button(link: &str, color: &str) -> String {
    format!(
        r#"<a href="{link}" target="_blank" style="{BUTTON_STYLE} background-color: {color};">Ver Oferta no Skyscanner</a>"#
    )
}

/// Sent right after an alert is stored, quoting the baseline price.
pub fn confirmation_email(from: &str, alert: &Alert, context: Option<&str>) -> EmailMessage {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6;">
  <h1>Alerta de Preço Ativado!</h1>
  <p>Olá!</p>
  <p>Confirmamos a criação do seu alerta para o voo de <strong>{origin}</strong> para <strong>{destination}</strong>.</p>
  <p>O preço atual que encontramos foi de <strong style="font-size: 1.2em;">{price}</strong>.</p>
  {context}
  {button}
  <br><br>
  <p>Boa viagem!</p>
  <p><em>Equipe Alerta de Voos</em></p>
</div>"#,
        origin = alert.origin,
        destination = alert.destination,
        price = format_brl(alert.last_price),
        context = context_paragraph(context),
        button = offer_button(&alert.purchase_link, "#00a698"),
    );

    EmailMessage {
        from: from.to_string(),
        to: alert.user_email.clone(),
        subject: format!(
            "Seu Alerta de Voo foi Criado! ({} -> {})",
            alert.origin, alert.destination
        ),
        html,
    }
}

/// Sent by the periodic check when the tracked fare moved. `alert.last_price`
/// is still the previous value at this point.
pub fn price_change_email(
    from: &str,
    alert: &Alert,
    new_price: Decimal,
    context: Option<&str>,
) -> EmailMessage {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6;">
  <h1>O preço da sua viagem mudou!</h1>
  <p>Olá!</p>
  <p>O voo de <strong>{origin}</strong> para <strong>{destination}</strong> que você está monitorando mudou de preço.</p>
  <p>Preço anterior: <strong>{old}</strong></p>
  <p>Novo preço: <strong style="font-size: 1.2em;">{new}</strong></p>
  {context}
  {button}
  <br><br>
  <p>Aproveite para conferir!</p>
  <p><em>Equipe Alerta de Voos</em></p>
</div>"#,
        origin = alert.origin,
        destination = alert.destination,
        old = format_brl(alert.last_price),
        new = format_brl(new_price),
        context = context_paragraph(context),
        button = offer_button(&alert.purchase_link, "#1a73e8"),
    );

    EmailMessage {
        from: from.to_string(),
        to: alert.user_email.clone(),
        subject: format!(
            "ALERTA DE PREÇO: Voo {} ✈️ {}",
            alert.origin, alert.destination
        ),
        html,
    }
}
