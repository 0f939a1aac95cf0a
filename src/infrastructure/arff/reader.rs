use crate::domain::models::{Attribute, AttributeKind, Dataset, Value};

use super::ArffError;

/// Parse ARFF text into a [`Dataset`].
///
/// Supports dense data with numeric, nominal and string attributes. `%`
/// starts a comment line, `?` is a missing value, and values may be quoted
/// with `'` or `"`.
pub fn parse_arff(text: &str) -> Result<Dataset, ArffError> {
    let mut relation: Option<String> = None;
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut in_data = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        if in_data {
            rows.push(parse_row(line, line_no, &attributes)?);
            continue;
        }

        let lower = line.to_ascii_lowercase();
        if lower.starts_with("@relation") {
            let rest = line["@relation".len()..].trim();
            let (name, _) = read_token(rest, line_no)?;
            relation = Some(name);
        } else if lower.starts_with("@attribute") {
            let rest = line["@attribute".len()..].trim();
            attributes.push(parse_attribute(rest, line_no)?);
        } else if lower.starts_with("@data") {
            if attributes.is_empty() {
                return Err(ArffError::Syntax {
                    line: line_no,
                    message: "@data before any @attribute".to_string(),
                });
            }
            in_data = true;
        } else {
            return Err(ArffError::Syntax {
                line: line_no,
                message: format!("unexpected header line '{line}'"),
            });
        }
    }

    let relation = relation.ok_or(ArffError::MissingRelation)?;
    if !in_data {
        return Err(ArffError::MissingData);
    }
    Ok(Dataset::new(relation, attributes, rows)?)
}

/// Read one bare or quoted token; returns it with the unread remainder.
fn read_token(input: &str, line: usize) -> Result<(String, &str), ArffError> {
    let input = input.trim_start();
    let mut chars = input.char_indices();
    match chars.next() {
        None => Err(ArffError::Syntax {
            line,
            message: "expected a name".to_string(),
        }),
        Some((_, quote @ ('\'' | '"'))) => {
            let mut out = String::new();
            let mut escaped = false;
            for (pos, c) in chars {
                if escaped {
                    out.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    return Ok((out, &input[pos + c.len_utf8()..]));
                } else {
                    out.push(c);
                }
            }
            Err(ArffError::Syntax {
                line,
                message: "unterminated quote".to_string(),
            })
        }
        Some(_) => {
            let end = input
                .find(|c: char| c.is_whitespace() || c == '{')
                .unwrap_or(input.len());
            Ok((input[..end].to_string(), &input[end..]))
        }
    }
}

fn parse_attribute(rest: &str, line: usize) -> Result<Attribute, ArffError> {
    let (name, type_spec) = read_token(rest, line)?;
    let type_spec = type_spec.trim();

    if let Some(inner) = type_spec.strip_prefix('{') {
        let inner = inner.strip_suffix('}').ok_or_else(|| ArffError::Syntax {
            line,
            message: format!("unterminated nominal domain for '{name}'"),
        })?;
        let values: Vec<String> = split_cells(inner, line)?
            .into_iter()
            .map(|(value, _)| value)
            .collect();
        if values.is_empty() {
            return Err(ArffError::Syntax {
                line,
                message: format!("empty nominal domain for '{name}'"),
            });
        }
        return Ok(Attribute {
            name,
            kind: AttributeKind::Nominal(values),
        });
    }

    match type_spec.to_ascii_lowercase().as_str() {
        "numeric" | "real" | "integer" => Ok(Attribute::numeric(name)),
        "string" => Ok(Attribute::text(name)),
        other => Err(ArffError::UnsupportedType {
            attribute: name,
            kind: other.to_string(),
        }),
    }
}

/// Split a comma-separated list, honouring quotes. The flag marks quoted cells.
fn split_cells(input: &str, line: usize) -> Result<Vec<(String, bool)>, ArffError> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut was_quoted = false;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(q) = quote {
            if escaped {
                current.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            } else {
                current.push(c);
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                was_quoted = true;
            }
            ',' => {
                cells.push((current.trim().to_string(), was_quoted));
                current.clear();
                was_quoted = false;
            }
            _ => current.push(c),
        }
    }
    if quote.is_some() {
        return Err(ArffError::Syntax {
            line,
            message: "unterminated quote".to_string(),
        });
    }
    if !current.trim().is_empty() || was_quoted || !cells.is_empty() {
        cells.push((current.trim().to_string(), was_quoted));
    }
    Ok(cells)
}

fn parse_row(
    line: &str,
    line_no: usize,
    attributes: &[Attribute],
) -> Result<Vec<Value>, ArffError> {
    if line.starts_with('{') {
        return Err(ArffError::Syntax {
            line: line_no,
            message: "sparse instances are not supported".to_string(),
        });
    }
    let cells = split_cells(line, line_no)?;
    if cells.len() != attributes.len() {
        return Err(ArffError::Syntax {
            line: line_no,
            message: format!("expected {} values, found {}", attributes.len(), cells.len()),
        });
    }

    cells
        .into_iter()
        .zip(attributes)
        .map(|((cell, quoted), attr)| {
            if cell == "?" && !quoted {
                return Ok(Value::Missing);
            }
            match &attr.kind {
                AttributeKind::Numeric => cell
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Value::Numeric)
                    .ok_or_else(|| ArffError::Syntax {
                        line: line_no,
                        message: format!("'{cell}' is not a number for attribute '{}'", attr.name),
                    }),
                AttributeKind::Nominal(_) => {
                    attr.index_of(&cell)
                        .map(Value::Nominal)
                        .ok_or_else(|| ArffError::Syntax {
                            line: line_no,
                            message: format!(
                                "'{cell}' is not in the domain of attribute '{}'",
                                attr.name
                            ),
                        })
                }
                AttributeKind::Text => Ok(Value::Text(cell)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "% comment\n@RELATION 'golf day'\n\n\
        @attribute outlook {sunny, overcast, 'light rain'}\n\
        @attribute temperature real\n\
        @attribute note string\n\n\
        @data\nsunny,85,'hot, dry'\n'light rain',?,plain\n";

    #[test]
    fn test_parse_header_and_rows() {
        let dataset = parse_arff(SAMPLE).unwrap();
        assert_eq!(dataset.relation(), "golf day");
        assert_eq!(dataset.num_attributes(), 3);
        assert_eq!(dataset.attributes()[0].num_values(), 3);
        assert_eq!(dataset.num_instances(), 2);
        assert_eq!(dataset.instances()[0][2], Value::Text("hot, dry".to_string()));
        assert_eq!(dataset.instances()[1][0], Value::Nominal(2));
        assert!(dataset.instances()[1][1].is_missing());
    }

    #[test]
    fn test_render_then_parse_keeps_dataset() {
        let dataset = parse_arff(SAMPLE).unwrap();
        let reparsed = parse_arff(&dataset.to_string()).unwrap();
        assert_eq!(dataset, reparsed);
    }

    #[test]
    fn test_rejects_unknown_nominal_value() {
        let err = parse_arff("@relation r\n@attribute a {x,y}\n@data\nz\n").unwrap_err();
        assert!(matches!(err, ArffError::Syntax { line: 4, .. }));
    }

    #[test]
    fn test_rejects_date_attributes() {
        let err = parse_arff("@relation r\n@attribute when date\n@data\n").unwrap_err();
        assert!(matches!(err, ArffError::UnsupportedType { .. }));
    }

    #[test]
    fn test_requires_data_section() {
        assert!(matches!(
            parse_arff("@relation r\n@attribute a numeric\n"),
            Err(ArffError::MissingData)
        ));
    }
}
