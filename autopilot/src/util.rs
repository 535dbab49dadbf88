use anyhow::{anyhow, Context, Result};
use hero_grid_core::constants::{PARAM_PASS_MONSTER_THRESHOLD, PARAM_PREFER_EXP_THRESHOLD};
use hero_grid_core::ParameterSpec;

/// Parses test selectors such as `3`, `7-9` into ids, keeping first-seen order.
pub fn parse_test_ids(args: &[String]) -> Result<Vec<u32>> {
    let mut ids = Vec::new();
    for arg in args {
        let token = arg.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((lhs, rhs)) = token.split_once('-') {
            let lo = parse_id(lhs)?;
            let hi = parse_id(rhs)?;
            for id in lo..=hi {
                push_unique(&mut ids, id);
            }
        } else {
            push_unique(&mut ids, parse_id(token)?);
        }
    }
    Ok(ids)
}

fn parse_id(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("invalid test id: {raw}"))
}

fn push_unique(ids: &mut Vec<u32>, id: u32) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// `name=min:max:step`
pub fn parse_param_spec(input: &str) -> Result<ParameterSpec> {
    let (name, range) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("parameter '{input}' must look like name=min:max:step"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("parameter '{input}' has an empty name"));
    }

    let parts: Vec<&str> = range.split(':').collect();
    let [min, max, step] = parts.as_slice() else {
        return Err(anyhow!("parameter '{input}' must look like name=min:max:step"));
    };
    let parse = |field: &str, raw: &str| -> Result<f64> {
        let value = raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("invalid {field} for parameter {name}: {raw}"))?;
        if !value.is_finite() {
            return Err(anyhow!("{field} for parameter {name} must be finite"));
        }
        Ok(value)
    };
    let min = parse("min", *min)?;
    let max = parse("max", *max)?;
    let step = parse("step", *step)?;
    if step <= 0.0 {
        return Err(anyhow!("step for parameter {name} must be > 0"));
    }
    Ok(ParameterSpec::new(name, min, max, step))
}

/// Parses each selector on its own so one bad token only drops itself.
pub fn select_test_ids(raw: &[String], available: usize) -> Vec<u32> {
    let mut ids = Vec::new();
    for token in raw {
        match parse_test_ids(std::slice::from_ref(token)) {
            Ok(parsed) => {
                for id in parsed {
                    if id == 0 || id as usize > available {
                        tracing::warn!("ignoring test id {id}: only 1..={available} exist");
                    } else if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
            Err(err) => tracing::warn!("ignoring selector '{token}': {err:#}"),
        }
    }
    ids
}

pub fn default_param_specs() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new(PARAM_PREFER_EXP_THRESHOLD, 0.0, 1.0, 0.05),
        ParameterSpec::new(PARAM_PASS_MONSTER_THRESHOLD, 0.0, 1.0, 0.05),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranges_expand_and_dedupe_in_order() {
        let ids = parse_test_ids(&args(&["5", "2-4", "3", "7-6", "1"])).unwrap();
        assert_eq!(ids, [5, 2, 3, 4, 1]);
        assert!(parse_test_ids(&args(&[])).unwrap().is_empty());
        assert!(parse_test_ids(&args(&["x"])).is_err());
        assert!(parse_test_ids(&args(&["1-"])).is_err());
    }

    #[test]
    fn selection_skips_bad_tokens_and_unknown_ids() {
        let ids = select_test_ids(&args(&["4", "x", "0", "9", "2-3", "4"]), 5);
        assert_eq!(ids, [4, 2, 3]);
        assert!(select_test_ids(&args(&["7-8", "?"]), 5).is_empty());
    }

    #[test]
    fn param_specs_parse() {
        let spec = parse_param_spec("preferExpThreshold=0:1:0.25").unwrap();
        assert_eq!(spec.name(), "preferExpThreshold");
        assert_eq!((spec.min(), spec.max(), spec.step()), (0.0, 1.0, 0.25));

        assert!(parse_param_spec("p=0:1").is_err());
        assert!(parse_param_spec("p=0:1:0").is_err());
        assert!(parse_param_spec("=0:1:1").is_err());
        assert!(parse_param_spec("p=a:1:1").is_err());
    }
}
