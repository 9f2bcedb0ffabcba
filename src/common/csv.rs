// src/common/csv.rs

/// Escapa um campo CSV: aspas, vírgulas e quebras de linha exigem aspas duplas.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_row(out: &mut String, fields: &[&str]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_untouched() {
        assert_eq!(escape_field("Concreto"), "Concreto");
    }

    #[test]
    fn quotes_and_commas_are_escaped() {
        assert_eq!(escape_field("Aço, CA-50"), "\"Aço, CA-50\"");
        assert_eq!(escape_field("viga \"V1\""), "\"viga \"\"V1\"\"\"");
        assert_eq!(escape_field("linha\nnova"), "\"linha\nnova\"");
    }

    #[test]
    fn rows_end_with_newline() {
        let mut out = String::new();
        write_row(&mut out, &["a", "b,c"]);
        assert_eq!(out, "a,\"b,c\"\n");
    }
}
