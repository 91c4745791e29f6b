use std::borrow::Cow;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, FieldsNamed, FieldsUnnamed};

parse_attrs_fn!(
	parse_field_attrs -> FieldAttrs {
		skip: Arg,
	}
);

parse_attrs_fn!(
	parse_struct_attrs -> StructAttrs {
		skip_after: Arg,
	}
);

pub fn derive_readable_impl(input: &DeriveInput) -> TokenStream {
	let (fields, tuple) = match &input.data {
		Data::Struct(DataStruct { fields: Fields::Named(FieldsNamed { named, .. }), .. }) => (named, false),
		Data::Struct(DataStruct { fields: Fields::Unnamed(FieldsUnnamed { unnamed, .. }), .. }) => (unnamed, true),
		_ => panic!("only tuple structs or structs with named fields supported"),
	};
	let mut body = quote! {};
	let mut initializer = quote! {};
	for (index, field) in fields.iter().enumerate() {
		let FieldAttrs { skip } = parse_field_attrs(&field.attrs);
		let mut field_expr = quote! { tr_level::Readable::read(cursor)? };
		if let Some(skip) = skip {
			field_expr = quote! {{
				cursor.skip(#skip)?;
				#field_expr
			}};
		}
		let field_ident = match &field.ident {
			Some(field_ident) => Cow::Borrowed(field_ident),
			None => Cow::Owned(Ident::new(&format!("field{}", index), Span::call_site())),
		};
		body = quote! {
			#body
			let #field_ident = #field_expr;
		};
		initializer = quote! { #initializer #field_ident, };
	}
	if let StructAttrs { skip_after: Some(skip) } = parse_struct_attrs(&input.attrs) {
		body = quote! {
			#body
			cursor.skip(#skip)?;
		};
	}
	let initializer = match tuple {
		true => quote! { (#initializer) },
		false => quote! { { #initializer } },
	};
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
	let type_name = &input.ident;
	quote! {
		impl #impl_generics tr_level::Readable for #type_name #ty_generics #where_clause {
			fn read<R: std::io::Read + std::io::Seek>(
				cursor: &mut tr_level::ByteCursor<R>,
			) -> tr_level::Result<Self> {
				#body
				Ok(#type_name #initializer)
			}
		}
	}
}
