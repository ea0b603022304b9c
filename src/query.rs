use sea_orm::{
    ActiveModelTrait, ColumnTrait, ColumnType, Condition, EntityTrait, Value,
    sea_query::{Expr, Func, SimpleExpr},
};
use std::str::FromStr;

use crate::params::{ParamError, ParamValue, RestApiParameter};

/// Separates a field name from its lookup, as in `age__gte`.
pub const LOOKUP_SEPARATOR: &str = "__";

/// Comparison applied between a column and a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    IContains,
    StartsWith,
    EndsWith,
    IsNull,
}

impl Lookup {
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "exact" => Lookup::Exact,
            "gt" => Lookup::Gt,
            "gte" => Lookup::Gte,
            "lt" => Lookup::Lt,
            "lte" => Lookup::Lte,
            "contains" => Lookup::Contains,
            "icontains" => Lookup::IContains,
            "startswith" => Lookup::StartsWith,
            "endswith" => Lookup::EndsWith,
            "isnull" => Lookup::IsNull,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Lookup::Exact => "exact",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::Contains => "contains",
            Lookup::IContains => "icontains",
            Lookup::StartsWith => "startswith",
            Lookup::EndsWith => "endswith",
            Lookup::IsNull => "isnull",
        }
    }
}

/// Split `age__gte` into `("age", Lookup::Gte)`. Names without a known
/// lookup suffix are exact matches on the whole name.
#[must_use]
pub fn split_lookup(name: &str) -> (&str, Lookup) {
    name.rsplit_once(LOOKUP_SEPARATOR)
        .and_then(|(field, suffix)| {
            Lookup::from_suffix(suffix)
                .filter(|_| !field.is_empty())
                .map(|lookup| (field, lookup))
        })
        .unwrap_or((name, Lookup::Exact))
}

/// Field names mapped to typed values, in the order they were first seen.
///
/// Built fresh for each request and handed straight to the model filter or to
/// row creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryKwargs {
    entries: Vec<(String, ParamValue)>,
}

impl QueryKwargs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any earlier value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// ANDs every entry into a filter condition on `E`.
    ///
    /// # Errors
    ///
    /// Fails when a name does not resolve to a column of `E`, or when the
    /// value type does not suit the lookup.
    pub fn to_condition<E>(&self) -> Result<Condition, ParamError>
    where
        E: EntityTrait,
    {
        self.entries
            .iter()
            .try_fold(Condition::all(), |condition, (name, value)| {
                let (field, lookup) = split_lookup(name);
                let column = resolve_column::<E>(field)?;
                let expr = lookup_expr(column, field, lookup, value)?;
                Ok(condition.add(expr))
            })
    }

    /// New, unsaved row with every named column set. Columns that are not
    /// named stay `NotSet`, so the database defaults apply on insert.
    ///
    /// # Errors
    ///
    /// Fails when a name is not a column of the entity (lookups are not
    /// accepted here) or when a value does not fit its column.
    pub fn to_active_model<A>(&self) -> Result<A, ParamError>
    where
        A: ActiveModelTrait,
    {
        let mut active_model = <A as ActiveModelTrait>::default();
        for (name, value) in &self.entries {
            let column = resolve_column::<A::Entity>(name)?;
            let mismatch = || ParamError::ColumnTypeMismatch {
                model: table_name::<A::Entity>(),
                field: name.clone(),
                param_type: value.param_type(),
            };

            let converted =
                column_value(column.def().get_column_type(), value).ok_or_else(mismatch)?;
            active_model
                .try_set(column, converted)
                .map_err(|_| mismatch())?;
        }
        Ok(active_model)
    }
}

impl FromIterator<RestApiParameter> for QueryKwargs {
    fn from_iter<I: IntoIterator<Item = RestApiParameter>>(iter: I) -> Self {
        let mut kwargs = QueryKwargs::new();
        for param in iter {
            let (name, value) = param.into_key_value();
            kwargs.insert(name, value);
        }
        kwargs
    }
}

/// Parses every `name::type` / value pair and collects the results.
///
/// # Errors
///
/// Stops at the first pair that fails to parse.
pub fn params_to_query_kwargs<I, K, V>(parameters: I) -> Result<QueryKwargs, ParamError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    parameters
        .into_iter()
        .map(|(key, value)| RestApiParameter::parse(key.as_ref(), value.as_ref()))
        .collect()
}

fn resolve_column<E>(field: &str) -> Result<E::Column, ParamError>
where
    E: EntityTrait,
{
    E::Column::from_str(field).map_err(|_| ParamError::UnknownField {
        model: table_name::<E>(),
        field: field.to_string(),
    })
}

fn table_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

/// `value` as the `Value` variant stored in a column of `column_type`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn column_value(column_type: &ColumnType, value: &ParamValue) -> Option<Value> {
    let converted = match (value, column_type) {
        (ParamValue::Int(number) | ParamValue::Fk(number), _) => {
            integer_value(column_type, *number)?
        }
        (ParamValue::Fl(number), ColumnType::Float) => Value::from(*number as f32),
        (ParamValue::Fl(number), ColumnType::Double) => Value::from(*number),
        (
            ParamValue::Str(text),
            ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_),
        ) => Value::from(text.clone()),
        (ParamValue::Bool(flag), ColumnType::Boolean) => Value::from(*flag),
        (ParamValue::Date(date), ColumnType::DateTime | ColumnType::Timestamp) => {
            Value::from(*date)
        }
        (ParamValue::Date(date), ColumnType::TimestampWithTimeZone) => Value::from(date.and_utc()),
        (ParamValue::Date(date), ColumnType::Date) => Value::from(date.date()),
        _ => return None,
    };
    Some(converted)
}

#[allow(clippy::cast_precision_loss)]
fn integer_value(column_type: &ColumnType, number: i64) -> Option<Value> {
    let converted = match column_type {
        ColumnType::TinyInteger => Value::from(i8::try_from(number).ok()?),
        ColumnType::SmallInteger => Value::from(i16::try_from(number).ok()?),
        ColumnType::Integer => Value::from(i32::try_from(number).ok()?),
        ColumnType::BigInteger => Value::from(number),
        ColumnType::TinyUnsigned => Value::from(u8::try_from(number).ok()?),
        ColumnType::SmallUnsigned => Value::from(u16::try_from(number).ok()?),
        ColumnType::Unsigned => Value::from(u32::try_from(number).ok()?),
        ColumnType::BigUnsigned => Value::from(u64::try_from(number).ok()?),
        ColumnType::Double => Value::from(number as f64),
        _ => return None,
    };
    Some(converted)
}

fn lookup_expr<C>(
    column: C,
    field: &str,
    lookup: Lookup,
    value: &ParamValue,
) -> Result<SimpleExpr, ParamError>
where
    C: ColumnTrait,
{
    let mismatch = || ParamError::LookupTypeMismatch {
        field: field.to_string(),
        lookup: lookup.as_str().to_string(),
        param_type: value.param_type(),
    };

    let expr = match lookup {
        Lookup::Exact => column.eq(value.clone()),
        Lookup::Gt => column.gt(value.clone()),
        Lookup::Gte => column.gte(value.clone()),
        Lookup::Lt => column.lt(value.clone()),
        Lookup::Lte => column.lte(value.clone()),
        Lookup::IsNull => match value {
            ParamValue::Bool(true) => column.is_null(),
            ParamValue::Bool(false) => column.is_not_null(),
            _ => return Err(mismatch()),
        },
        Lookup::Contains | Lookup::IContains | Lookup::StartsWith | Lookup::EndsWith => {
            let ParamValue::Str(text) = value else {
                return Err(mismatch());
            };
            match lookup {
                Lookup::Contains => column.contains(text),
                Lookup::StartsWith => column.starts_with(text),
                Lookup::EndsWith => column.ends_with(text),
                _ => SimpleExpr::FunctionCall(Func::upper(Expr::col(column)))
                    .like(format!("%{}%", text.to_uppercase())),
            }
        }
    };
    Ok(expr)
}
