// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

/// Widest row the ledger reader will look at; extra columns are ignored.
pub const MAX_FIELDS: usize = 16;

/// Split one ledger line into trimmed fields.
///
/// Commas inside double quotes are literal and `""` inside quotes is an
/// escaped quote. A bare `\r` outside quotes is dropped and a `\n` ends the
/// line. Once `max_fields` fields have been closed by a comma the rest of the
/// line is ignored. The result always holds at least one (possibly empty) field.
pub fn split_fields(line: &str, max_fields: usize) -> Vec<String> {
    let max_fields = max_fields.max(1);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }
        match c {
            '\n' => break,
            '"' => in_quotes = true,
            ',' => {
                fields.push(current.trim().to_string());
                current.clear();
                if fields.len() >= max_fields {
                    return fields;
                }
            }
            '\r' => {}
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}
