//! Terminal cards for a meal plan.

use colored::*;

use crate::recipe::{MealSlot, Recipe};
use crate::MealPlan;

/// Format hundredths of a currency unit as `$X.YY`.
pub fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Drop markup tags, decode entities and collapse whitespace so API
/// instructions read as plain text.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = html_escape::decode_html_entities(&out);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One card: heading, name, optional time/price, ingredients, instructions, links.
pub fn render_card(slot: MealSlot, recipe: &Recipe) -> String {
    let mut lines = Vec::new();
    lines.push(slot.as_str().to_uppercase().bright_cyan().bold().to_string());
    lines.push(recipe.name().bold().to_string());

    if let Some(mins) = recipe.ready_in_minutes().filter(|m| *m > 0) {
        lines.push(format!("⏱ {} mins", mins));
    }
    if let Some(cents) = recipe.price_per_serving().filter(|c| *c > 0) {
        lines.push(format!("💲 {} per serving", format_price(cents)));
    }
    for ingredient in recipe.ingredients() {
        lines.push(format!("  • {}", ingredient));
    }

    lines.push(strip_markup(recipe.instructions()));

    if let Some(url) = recipe.source_url() {
        lines.push(format!("Full Recipe: {}", url.bright_blue().underline()));
    }
    if let Some(image) = recipe.image() {
        lines.push(format!("Image: {}", image.dimmed()));
    }
    lines.join("\n")
}

/// All filled slots, in serving order, separated by blank lines.
pub fn render_plan(plan: &MealPlan) -> String {
    if plan.is_empty() {
        return "No meals found for these filters.".yellow().to_string();
    }
    plan.iter()
        .map(|(slot, recipe)| render_card(slot, recipe))
        .collect::<Vec<_>>()
        .join("\n\n")
}
