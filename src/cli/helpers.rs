use crate::cli::LinkArgs;
use anyhow::{Result, anyhow};
use event_permalinks::rewrite::matchers::Matcher;
use event_permalinks::{QueryVars, Rewriter, ViewLink};

/// Compiled rules, one `regex => query` line each, plus the fingerprint
pub fn render_rules(rewriter: &Rewriter) -> Result<String> {
    let table = rewriter.generate()?;
    let mut output = String::new();
    for line in table.lines() {
        output.push_str(&line);
        output.push('\n');
    }
    output.push_str(&format!(
        "📋 {} rules for {} (fingerprint {})\n",
        table.len(),
        rewriter.locale(),
        table.fingerprint()
    ));
    Ok(output)
}

pub fn render_rules_json(rewriter: &Rewriter) -> Result<String> {
    let table = rewriter.generate()?;
    Ok(serde_json::to_string_pretty(&table.rows())?)
}

pub fn render_bases(rewriter: &Rewriter, raw: bool) -> String {
    let bases = rewriter.bases();
    let mut output = String::new();
    if raw {
        for slug in bases.slugs.iter() {
            output.push_str(&format!("{}: {}\n", slug.name(), slug.alternatives().join(", ")));
        }
    } else {
        for (name, regex) in &bases.regex {
            output.push_str(&format!("{}: {}\n", name, regex));
        }
    }
    output
}

pub fn render_matchers(rewriter: &Rewriter) -> String {
    let matchers = rewriter.localized_matchers();
    let mut output = String::new();
    for (regex, matcher) in matchers.iter() {
        let line = match matcher {
            Matcher::Localized(localized) => format!(
                "{} => {} (slug: {})",
                regex, localized.query_var, localized.localized_slug
            ),
            Matcher::QueryVar(query_var) => format!("{} => {}", regex, query_var),
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}

pub fn render_resolution(rewriter: &Rewriter, url: &str) -> String {
    match rewriter.parse_request(url, &QueryVars::new()) {
        Some(query_vars) => {
            let mut output = format!("✅ {}\n", url);
            for (key, value) in &query_vars {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
            output
        }
        None => format!("❌ No rule matched {}\n", url),
    }
}

pub fn view_link_from_args(args: &LinkArgs) -> ViewLink {
    ViewLink {
        display: args.display.clone(),
        date: args.date.clone(),
        featured: args.featured,
        categories: args.category.clone(),
        page: args.page,
    }
}

/// Validate every rule spec, then compile the whole table
pub fn check_rules(rewriter: &Rewriter) -> Result<String> {
    let specs = rewriter.rule_specs();
    let errors: Vec<String> = specs
        .iter()
        .filter_map(|spec| spec.validate().err().map(|e| e.to_string()))
        .collect();
    if !errors.is_empty() {
        return Err(anyhow!("{} invalid rule(s):\n  {}", errors.len(), errors.join("\n  ")));
    }

    let table = rewriter.generate()?;
    Ok(format!("✅ {} rules OK (fingerprint {})\n", table.len(), table.fingerprint()))
}
