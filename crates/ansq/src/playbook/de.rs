//! field decoders
//!
//! Scalar play/task fields follow the binding rules playbook authors are used to:
//!
//! | field   | accepts                                                   | `null`/absent |
//! |---------|-----------------------------------------------------------|---------------|
//! | string  | any scalar, rendered to text                              | `""`          |
//! | bool    | `true`/`false`, `yes`/`no`, `on`/`off`, `y`/`n` (any case) | `false`       |
//! | int     | integers, floats without fractional part                  | `0`           |
//! | strings | a sequence of scalars                                     | absent        |
//! | list    | a sequence of records, `null` entries are default records | empty         |
//!
//! Everything else is a type mismatch and fails the whole file.
use serde::de::{Deserialize, Deserializer, Error, Unexpected};
use serde_yaml::Value as Yaml;

fn untag(value: Yaml) -> Yaml {
    match value {
        Yaml::Tagged(tagged) => {
            let tagged = *tagged;
            untag(tagged.value)
        }
        value => value,
    }
}

fn unexpected(value: &Yaml) -> Unexpected<'_> {
    match value {
        Yaml::Null => Unexpected::Unit,
        Yaml::Bool(b) => Unexpected::Bool(*b),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Unexpected::Signed(i),
            (None, Some(f)) => Unexpected::Float(f),
            _ => Unexpected::Other("number"),
        },
        Yaml::String(s) => Unexpected::Str(s),
        Yaml::Sequence(_) => Unexpected::Seq,
        Yaml::Mapping(_) => Unexpected::Map,
        Yaml::Tagged(_) => Unexpected::Other("tagged value"),
    }
}

fn scalar_text(value: Yaml) -> Result<String, Yaml> {
    match untag(value) {
        Yaml::Null => Ok(String::new()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::String(s) => Ok(s),
        other => Err(other),
    }
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Yaml::deserialize(deserializer)?;
    scalar_text(value).map_err(|other| D::Error::invalid_type(unexpected(&other), &"a string"))
}

pub(crate) fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match untag(Yaml::deserialize(deserializer)?) {
        Yaml::Null => Ok(false),
        Yaml::Bool(b) => Ok(b),
        Yaml::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => Ok(true),
            "false" | "no" | "n" | "off" => Ok(false),
            _ => Err(D::Error::invalid_value(Unexpected::Str(&s), &"a boolean")),
        },
        other => Err(D::Error::invalid_type(unexpected(&other), &"a boolean")),
    }
}

pub(crate) fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match untag(Yaml::deserialize(deserializer)?) {
        Yaml::Null => Ok(0),
        Yaml::Number(n) => {
            if let Some(int) = n.as_i64() {
                return Ok(int);
            }

            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(D::Error::invalid_value(
                    unexpected(&Yaml::Number(n)),
                    &"an integer",
                )),
            }
        }
        other => Err(D::Error::invalid_type(unexpected(&other), &"an integer")),
    }
}

pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match untag(Yaml::deserialize(deserializer)?) {
        Yaml::Null => Ok(None),
        Yaml::Sequence(items) => items
            .into_iter()
            .map(|item| {
                scalar_text(item)
                    .map_err(|other| D::Error::invalid_type(unexpected(&other), &"a string"))
            })
            .collect::<Result<_, _>>()
            .map(Some),
        other => Err(D::Error::invalid_type(
            unexpected(&other),
            &"a list of strings",
        )),
    }
}

pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[derive(serde::Deserialize, Debug, PartialEq, Default)]
    #[serde(default)]
    struct Fields {
        #[serde(deserialize_with = "super::string")]
        text: String,
        #[serde(deserialize_with = "super::bool")]
        flag: bool,
        #[serde(deserialize_with = "super::int")]
        number: i64,
        #[serde(deserialize_with = "super::strings")]
        list: Option<Vec<String>>,
    }

    #[derive(serde::Deserialize, Debug, PartialEq, Default)]
    #[serde(default)]
    struct Records {
        #[serde(deserialize_with = "super::list")]
        records: Vec<Fields>,
    }

    fn fields(yaml: &str) -> Result<Fields, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn defaults() {
        assert_eq!(fields("{}").unwrap(), Fields::default());
        assert_eq!(
            fields("{text: ~, flag: ~, number: ~, list: ~}").unwrap(),
            Fields::default()
        );
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(fields("text: 30").unwrap().text, "30");
        assert_eq!(fields("text: true").unwrap().text, "true");
        assert_eq!(fields("text: !unsafe '{{ x }}'").unwrap().text, "{{ x }}");
    }

    #[test]
    fn yaml_11_booleans() {
        assert!(fields("flag: yes").unwrap().flag);
        assert!(fields("flag: On").unwrap().flag);
        assert!(!fields("flag: no").unwrap().flag);
        assert!(fields("flag: maybe").is_err());
        assert!(fields("flag: 1").is_err());
    }

    #[test]
    fn integers() {
        assert_eq!(fields("number: 42").unwrap().number, 42);
        assert_eq!(fields("number: 3.0").unwrap().number, 3);
        assert!(fields("number: 2.5").is_err());
        assert!(fields("number: 30%").is_err());
        assert!(fields("number: [1]").is_err());
    }

    #[test]
    fn lists() {
        assert_eq!(
            fields("list: [deploy, 1]").unwrap().list,
            Some(vec!["deploy".to_string(), "1".to_string()])
        );
        assert!(fields("list: deploy").is_err());
        assert!(fields("text: [a]").is_err());
    }

    #[test]
    fn records_with_null_entries() {
        let records: Records = serde_yaml::from_str("records:\n  - {number: 1}\n  -\n").unwrap();
        assert_eq!(
            records.records,
            vec![
                Fields {
                    number: 1,
                    ..Default::default()
                },
                Fields::default()
            ]
        );

        let records: Records = serde_yaml::from_str("records: ~").unwrap();
        assert!(records.records.is_empty());
        assert!(serde_yaml::from_str::<Records>("records: {number: 1}").is_err());
    }
}
