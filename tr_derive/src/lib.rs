mod attrs;
mod readable;

/// Derives `tr_level::Readable` for a fixed-layout record, reading fields in declaration order.
///
/// Field attributes:
/// - `#[skip(n)]`: skip `n` bytes before reading the field.
///
/// Struct attributes:
/// - `#[skip_after(n)]`: skip `n` bytes after the last field.
#[proc_macro_derive(Readable, attributes(skip, skip_after))]
pub fn derive_readable(tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
	readable::derive_readable_impl(&syn::parse_macro_input!(tokens)).into()
}
