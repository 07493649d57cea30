//! Terminal rendering of the portal view models.

use portal_lib::views::{ChatLine, ChatView, DashboardView, HistoryRow, ManagerView, ResidentRow};

pub fn residents(rows: &[ResidentRow]) {
    println!(
        "{:<12} {:<20} {:<16} {:<10} {:<24} {:>6}  {}",
        "ID", "USUARIO", "ALIAS", "ESTADO", "VENCE", "MBPS", "MENSAJES"
    );
    for row in rows {
        println!(
            "{:<12} {:<20} {:<16} {:<10} {:<24} {:>6}  {}",
            row.user_id,
            row.username,
            row.alias.as_deref().unwrap_or("-"),
            row.badge.label,
            row.next_payment_date,
            row.internet_speed,
            if row.has_unread() {
                format!("{} sin leer", row.unread)
            } else {
                String::new()
            }
        );
    }
}

fn chat_line(line: &ChatLine) {
    let indent = if line.outgoing { "        " } else { "" };
    println!("{}[{}] {}: {}", indent, line.time, line.author, line.text);
}

pub fn chat(view: &ChatView) {
    println!("{}", view.title);
    for line in &view.lines {
        chat_line(line);
    }
}

pub fn history(rows: &[HistoryRow]) {
    for row in rows {
        println!(
            "  {}  {:<16} {}  {:<12} {}",
            row.id,
            row.period,
            row.date,
            row.amount,
            row.badge.label
        );
    }
}

pub fn manager(view: &ManagerView) {
    println!("{}", view.title);
    println!("  Usuario:      {}", view.username);
    println!("  Alias:        {}", view.alias);
    println!("  Estado:       {}", view.badge.label);
    println!("  Próximo pago: {}", view.next_payment_date);
    println!("  Velocidad:    {} Mbps", view.internet_speed);
    println!("  WiFi SSID:    {}", view.wifi_ssid);
    println!("  WiFi clave:   {}", view.wifi_password);
    match view.wifi.qr_url() {
        Some(url) => println!("  QR:           {}", url),
        None => println!("  QR:           {}", portal_lib::views::QR_PLACEHOLDER),
    }
    println!("  Historial:");
    history(&view.history);
}

pub fn dashboard(view: &DashboardView) {
    println!("{}  ({})", view.display_name, view.alias_label);
    println!("  Estado:       {} [{}]", view.badge.label, view.badge.css_class);
    println!("  Próximo pago: {}", view.next_payment_date);
    println!(
        "  Velocidad:    {} Mbps  {}",
        view.internet_speed,
        gauge(view.speed_percent)
    );
    println!("  WiFi SSID:    {}", view.wifi.ssid_label());
    println!("  WiFi clave:   {}", view.wifi.password_label());
    if let Some(url) = view.wifi.qr_url() {
        println!("  QR:           {}", url);
    }
    println!("  Mensajes:");
    for line in &view.messages {
        chat_line(line);
    }
}

fn gauge(percent: u8) -> String {
    let filled = usize::from(percent) / 5;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}
