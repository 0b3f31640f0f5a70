//! Naming and formatting helpers shared by the emitters.

use crate::profile::Profile;

/// snake_case → camelCase, e.g. `init_pagekitenet` → `initPagekitenet`.
/// Only an underscore followed by a lowercase letter is folded.
pub fn camel_case(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Short anchor for a function: drop `aeiouy` and underscores.
/// Distinct names may collide; nothing checks for that.
pub fn disemvowel(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y' | '_'))
        .collect()
}

/// Break every line at the first run of spaces that starts past `width`
/// characters and follows a non-space character.
pub fn wrap_lines(text: &str, width: usize) -> String {
    text.split('\n')
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut start = 0;
    loop {
        let cut = (start + width + 1..chars.len())
            .find(|&p| chars[p] == ' ' && !chars[p - 1].is_whitespace());
        match cut {
            Some(p) => {
                out.extend(&chars[start..p]);
                out.push('\n');
                start = p;
                while start < chars.len() && chars[start] == ' ' {
                    start += 1;
                }
            }
            None => {
                out.extend(&chars[start..]);
                return out;
            }
        }
    }
}

/// Calendar year (UTC) of a Unix timestamp.
pub fn year_from_unix(secs: u64) -> u32 {
    // Days-to-civil conversion over 400-year eras.
    let z = secs / 86_400 + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    u32::try_from(year).unwrap_or(u32::MAX)
}

const WARNING: &str = "* * *   WARNING: This file is auto-generated, do not edit!  * * *";

/// Copyright banner as a C block comment (C and Java outputs).
pub fn c_banner(file: &str, profile: &Profile, year: u32) -> String {
    let stars = "*".repeat(79);
    let mut lines = vec![
        format!("/* {}", "*".repeat(76)),
        format!("   {} - Wrappers for the {} API", file, profile.project),
        String::new(),
        format!("      {}", WARNING),
        String::new(),
        stars,
        copyright_line(profile, year),
        String::new(),
    ];
    lines.extend(profile.license_lines.iter().cloned());
    lines.push(format!("{} */", "*".repeat(76)));
    lines.join("\n") + "\n"
}

/// Copyright banner as `#` comments (Python output).
pub fn hash_banner(file: &str, profile: &Profile, year: u32) -> String {
    let rule = "#".repeat(79);
    let mut lines = vec![
        rule.clone(),
        format!("#    {} - Wrappers for the {} API", file, profile.project),
        "#".to_string(),
        format!("#       {}", WARNING),
        "#".to_string(),
        rule.clone(),
        format!("# {}", copyright_line(profile, year)),
        "#".to_string(),
    ];
    lines.extend(profile.license_lines.iter().map(|l| {
        if l.is_empty() {
            "#".to_string()
        } else {
            format!("# {}", l)
        }
    }));
    lines.push(rule);
    lines.join("\n") + "\n"
}

fn copyright_line(profile: &Profile, year: u32) -> String {
    format!(
        "This file is Copyright {}-{}, {}",
        profile.copyright_since, year, profile.copyright_holder
    )
}
