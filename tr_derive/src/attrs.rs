#![macro_use]

/// Generates a parser collecting the listed helper attributes, each taking a token argument,
/// e.g. `#[skip(4)]` yields `Some(4)`.
macro_rules! parse_attrs_fn {
	(
		$fn_name:ident -> $type_name:ident {
			$($attr_name:ident: Arg,)*
		}
	) => {
		struct $type_name<'a> {
			$($attr_name: Option<&'a proc_macro2::TokenStream>,)*
		}
		
		fn $fn_name<'a>(attrs: &'a [syn::Attribute]) -> $type_name<'a> {
			$(let mut $attr_name = None;)*
			for attr in attrs {
				if let Some(ident) = attr.path().get_ident() {
					match ident.to_string().as_str() {
						$(
							stringify!($attr_name) => match (&$attr_name, &attr.meta) {
								(None, syn::Meta::List(syn::MetaList { tokens, .. })) => $attr_name = Some(tokens),
								(None, _) => panic!("{} takes an argument", stringify!($attr_name)),
								(Some(_), _) => panic!("cannot use {} more than once", stringify!($attr_name)),
							},
						)*
						_ => {},
					}
				}
			}
			$type_name { $($attr_name),* }
		}
	};
}
