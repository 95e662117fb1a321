//! Attribute parsing for `#[opts(...)]`.

use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Field, LitStr};

/// Case conversion for keys that are not named explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    /// `camelCase`
    CamelCase,
    /// `PascalCase`
    PascalCase,
    /// `lowercase`
    LowerCase,
    /// `kebab-case`
    KebabCase,
}

impl RenameRule {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "camelCase" => Some(Self::CamelCase),
            "PascalCase" => Some(Self::PascalCase),
            "lowercase" => Some(Self::LowerCase),
            "kebab-case" => Some(Self::KebabCase),
            _ => None,
        }
    }

    /// Apply the rule to a `snake_case` field name.
    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::CamelCase => {
                let mut words = name.split('_').filter(|w| !w.is_empty());
                let first = words.next().unwrap_or_default().to_string();
                words.fold(first, |mut acc, word| {
                    acc.push_str(&capitalize(word));
                    acc
                })
            }
            Self::PascalCase => name.split('_').map(capitalize).collect(),
            Self::LowerCase => name.replace('_', "").to_lowercase(),
            Self::KebabCase => name.replace('_', "-"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Struct-level options.
#[derive(Debug, Default)]
pub(crate) struct StructOptions {
    /// Root key of the generated `ToBody`.
    pub(crate) root: Option<LitStr>,
    /// Key case for fields without an explicit key.
    pub(crate) rename_all: Option<RenameRule>,
}

/// Where a field goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Query(Option<String>),
    Body(Option<String>),
    Ignore,
    Flatten,
    Skip,
}

impl Target {
    const fn describe(&self) -> &'static str {
        match self {
            Self::Query(_) => "query",
            Self::Body(_) => "body",
            Self::Ignore => "ignore",
            Self::Flatten => "flatten",
            Self::Skip => "skip",
        }
    }
}

/// Query sequence policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Multi,
    Csv,
}

/// A name resolved to an identifier through the lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lookup {
    pub(crate) key: String,
    pub(crate) kind: String,
}

/// Field-level options, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldOptions {
    pub(crate) target: Target,
    pub(crate) required: bool,
    pub(crate) keep_zero: bool,
    pub(crate) format: Option<Format>,
    pub(crate) lookup: Option<Lookup>,
}

impl FieldOptions {
    /// The serialized key for query and body targets.
    pub(crate) fn key(&self, field: &Field, rename_all: Option<RenameRule>) -> String {
        let explicit = match &self.target {
            Target::Query(key) | Target::Body(key) => key.clone(),
            _ => None,
        };
        explicit.unwrap_or_else(|| {
            let name = field_name(field);
            rename_all.map_or_else(|| name.clone(), |rule| rule.apply(&name))
        })
    }
}

/// The field's identifier without any `r#` prefix.
pub(crate) fn field_name(field: &Field) -> String {
    field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_default()
}

/// Parse struct-level `#[opts(root = "...", rename_all = "...")]`.
pub(crate) fn parse_struct_options(attrs: &[Attribute]) -> syn::Result<StructOptions> {
    let mut options = StructOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("opts")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("root") {
                options.root = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                let rule = RenameRule::parse(&value.value()).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &value,
                        "unknown rename_all value, expected camelCase, PascalCase, lowercase or kebab-case",
                    )
                })?;
                options.rename_all = Some(rule);
            } else {
                return Err(meta.error("unknown struct option, expected `root` or `rename_all`"));
            }
            Ok(())
        })?;
    }

    Ok(options)
}

/// Parse and validate a field's `#[opts(...)]` attributes.
///
/// A field without any target goes to the body under its own name.
pub(crate) fn parse_field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut target: Option<Target> = None;
    let mut required = false;
    let mut keep_zero = false;
    let mut format = None;
    let mut lookup = None;

    let mut set_target = |new: Target, span: proc_macro2::Span| -> syn::Result<()> {
        if let Some(existing) = &target {
            return Err(syn::Error::new(
                span,
                format!(
                    "conflicting targets `{}` and `{}`",
                    existing.describe(),
                    new.describe()
                ),
            ));
        }
        target = Some(new);
        Ok(())
    };

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("opts")) {
        attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            if meta.path.is_ident("query") || meta.path.is_ident("body") {
                let key = if meta.input.peek(syn::Token![=]) {
                    Some(meta.value()?.parse::<LitStr>()?.value())
                } else {
                    None
                };
                let new = if meta.path.is_ident("query") {
                    Target::Query(key)
                } else {
                    Target::Body(key)
                };
                set_target(new, span)?;
            } else if meta.path.is_ident("ignore") {
                set_target(Target::Ignore, span)?;
            } else if meta.path.is_ident("flatten") {
                set_target(Target::Flatten, span)?;
            } else if meta.path.is_ident("skip") {
                set_target(Target::Skip, span)?;
            } else if meta.path.is_ident("required") {
                required = true;
            } else if meta.path.is_ident("keep_zero") {
                keep_zero = true;
            } else if meta.path.is_ident("format") {
                let value: LitStr = meta.value()?.parse()?;
                format = Some(match value.value().as_str() {
                    "multi" => Format::Multi,
                    "csv" => Format::Csv,
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &value,
                            "unknown format, expected \"multi\" or \"csv\"",
                        ));
                    }
                });
            } else if meta.path.is_ident("lookup") {
                let mut key = None;
                let mut kind = None;
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("key") {
                        key = Some(inner.value()?.parse::<LitStr>()?.value());
                    } else if inner.path.is_ident("kind") {
                        kind = Some(inner.value()?.parse::<LitStr>()?.value());
                    } else {
                        return Err(inner.error("expected `key` or `kind`"));
                    }
                    Ok(())
                })?;
                let (Some(key), Some(kind)) = (key, kind) else {
                    return Err(syn::Error::new(span, "lookup needs both `key` and `kind`"));
                };
                lookup = Some(Lookup { key, kind });
            } else {
                return Err(meta.error(
                    "unknown field option, expected one of query, body, required, keep_zero, ignore, lookup, format, flatten, skip",
                ));
            }
            Ok(())
        })?;
    }

    let span = field.span();
    let target = match (target, &lookup) {
        (None | Some(Target::Ignore), Some(_)) => Target::Ignore,
        (Some(other), Some(_)) => {
            return Err(syn::Error::new(
                span,
                format!("`lookup` implies `ignore` and cannot be combined with `{}`", other.describe()),
            ));
        }
        (Some(target), None) => target,
        (None, None) => Target::Body(None),
    };

    if format.is_some() && !matches!(target, Target::Query(_)) {
        return Err(syn::Error::new(span, "`format` only applies to query fields"));
    }
    if required && matches!(target, Target::Flatten | Target::Skip) {
        return Err(syn::Error::new(
            span,
            format!("`required` cannot be used with `{}`", target.describe()),
        ));
    }

    if keep_zero && !matches!(target, Target::Query(_) | Target::Body(_)) {
        return Err(syn::Error::new(
            span,
            format!("`keep_zero` cannot be used with `{}`", target.describe()),
        ));
    }

    Ok(FieldOptions {
        target,
        required,
        keep_zero,
        format,
        lookup,
    })
}
