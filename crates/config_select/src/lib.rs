//! Build-time type selection
//!
//! The harness picks its platform at compile time. This crate exposes [select_env], a proc
//! macro that expands to one of several paths depending on the value of an environment
//! variable.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream, Result};
use syn::{LitStr, Path, Token};

/// A proc macro to select one path based on an environment variable.
///
/// Usage:
///
/// ```rs
/// pub type Plat = select_env!["TPU_PLATFORM_NAME":
///     "qemu_virt" => virt::VirtPlatform
///     _           => sim::SimPlatform
/// ];
/// ```
#[proc_macro]
pub fn select_env(tokens: TokenStream) -> TokenStream {
    let selection = syn::parse_macro_input!(tokens as Selection);
    let value = std::env::var(selection.env_var.value()).ok();

    match selection.resolve(value.as_deref()) {
        Ok(target) => TokenStream::from(quote!(#target)),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

struct Selection {
    env_var: LitStr,
    arms: Vec<Arm>,
}

impl Selection {
    /// Returns the target of the first arm matching `value`, or of the `_` arm.
    fn resolve(&self, value: Option<&str>) -> Result<&Path> {
        if let Some(value) = value {
            let matching = self
                .arms
                .iter()
                .find(|arm| arm.pattern.as_deref() == Some(value));
            if let Some(arm) = matching {
                return Ok(&arm.target);
            }
        }

        if let Some(default) = self.arms.iter().find(|arm| arm.pattern.is_none()) {
            return Ok(&default.target);
        }

        let message = match value {
            Some(value) => format!(
                "environment variable '{}' has value '{}' which doesn't match any case",
                self.env_var.value(),
                value
            ),
            None => format!(
                "environment variable '{}' is not set, but there is no default case",
                self.env_var.value()
            ),
        };
        Err(syn::Error::new(self.env_var.span(), message))
    }
}

impl Parse for Selection {
    fn parse(input: ParseStream) -> Result<Self> {
        let env_var = input.parse::<LitStr>()?;
        input.parse::<Token![:]>()?;
        let mut arms = Vec::new();
        while !input.is_empty() {
            arms.push(input.parse::<Arm>()?);
        }
        Ok(Self { env_var, arms })
    }
}

/// One `"value" => path` or `_ => path` case.
struct Arm {
    /// `None` for the `_` pattern.
    pattern: Option<String>,
    target: Path,
}

impl Parse for Arm {
    fn parse(input: ParseStream) -> Result<Self> {
        let pattern = if input.parse::<Token![_]>().is_ok() {
            None
        } else {
            Some(input.parse::<LitStr>()?.value())
        };
        input.parse::<Token![=>]>()?;
        let target = input.parse::<Path>()?;

        Ok(Arm { pattern, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        syn::parse_str(r#""TPU_PLATFORM_NAME": "qemu_virt" => virt::VirtPlatform _ => sim::SimPlatform"#)
            .unwrap()
    }

    fn path_str(path: &Path) -> String {
        quote!(#path).to_string().replace(' ', "")
    }

    #[test]
    fn picks_matching_arm() {
        let selection = selection();
        let target = selection.resolve(Some("qemu_virt")).unwrap();
        assert_eq!(path_str(target), "virt::VirtPlatform");
    }

    #[test]
    fn falls_back_to_default() {
        let selection = selection();
        assert_eq!(
            path_str(selection.resolve(None).unwrap()),
            "sim::SimPlatform"
        );
        assert_eq!(
            path_str(selection.resolve(Some("unknown")).unwrap()),
            "sim::SimPlatform"
        );
    }

    #[test]
    fn no_default_is_an_error() {
        let selection: Selection =
            syn::parse_str(r#""TPU_PLATFORM_NAME": "qemu_virt" => virt::VirtPlatform"#).unwrap();
        assert!(selection.resolve(Some("sim")).is_err());
        assert!(selection.resolve(None).is_err());
    }
}
