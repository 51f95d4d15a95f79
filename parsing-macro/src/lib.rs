use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    braced, bracketed, parse::Parse, parse_macro_input, punctuated::Punctuated, spanned::Spanned,
    token::Comma, Attribute, Expr, Field, Generics, Ident, Token, Visibility,
};

enum ParsingDirective {
    Magic {
        typ: syn::Type,
        val: Expr,
    },
    Ignore {
        typ: syn::Type,
    },
    Padding {
        num_bytes: Expr,
    },
    Param {
        typ: syn::Type,
        name: Ident,
        encode: Option<Expr>,
    },
}

/*

pub struct Header {
    [[magic: u32 = 0x0401]]
    pub field1: u16,
    [[padding_bytes = 4]]
    pub field2: u8,
    [[param: u8 = string_len, encode = self.s.len()]]
}
*/

impl Parse for ParsingDirective {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let outer;
        bracketed!(outer in input);
        let inner;
        bracketed!(inner in outer);
        let input = &inner;

        let ident = input.parse::<Ident>()?;
        let directive = match ident.to_string().as_str() {
            "magic" => {
                input.parse::<Token![:]>()?;
                let typ: syn::Type = input.parse()?;
                input.parse::<Token![=]>()?;
                let val: Expr = input.parse()?;
                Self::Magic { typ, val }
            }
            "padding_bytes" => {
                input.parse::<Token![=]>()?;
                let num_bytes: Expr = input.parse()?;
                Self::Padding { num_bytes }
            }
            "ignore" => {
                input.parse::<Token![:]>()?;
                let typ: syn::Type = input.parse()?;
                Self::Ignore { typ }
            }
            "param" => {
                input.parse::<Token![:]>()?;
                let typ: syn::Type = input.parse()?;
                input.parse::<Token![=]>()?;
                let name: Ident = input.parse()?;
                let encode = if input.peek(Token![,]) {
                    input.parse::<Token![,]>()?;
                    let key = input.parse::<Ident>()?;
                    if key != "encode" {
                        return Err(syn::Error::new(key.span(), "expected `encode = <expr>`"));
                    }
                    input.parse::<Token![=]>()?;
                    Some(input.parse::<Expr>()?)
                } else {
                    None
                };
                Self::Param { typ, name, encode }
            }
            _ => {
                return Err(syn::Error::new(
                    ident.span(),
                    "expected one of `magic`, `padding_bytes`, `ignore`, `param`",
                ))
            }
        };
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after directive"));
        }
        Ok(directive)
    }
}

impl ParsingDirective {
    fn parse_tokens(&self) -> proc_macro2::TokenStream {
        match self {
            ParsingDirective::Magic { typ, val } => {
                quote! {
                    {
                        let expected: #typ = #val;
                        let found = input.read_type::<E, #typ>()?;
                        if found != expected {
                            return Err(::parsing::Error::MagicCheckFailed {
                                expected: u64::from(expected),
                                found: u64::from(found),
                            });
                        }
                    }
                }
            }
            ParsingDirective::Padding { num_bytes } => {
                quote! {
                    input.skip(#num_bytes)?;
                }
            }
            ParsingDirective::Param { typ, name, .. } => {
                quote! {
                    let #name = input.read_type::<E, #typ>()?;
                }
            }
            ParsingDirective::Ignore { typ } => {
                quote! {
                    input.read_type::<E, #typ>()?;
                }
            }
        }
    }

    fn encode_tokens(&self) -> syn::Result<proc_macro2::TokenStream> {
        Ok(match self {
            ParsingDirective::Magic { typ, val } => {
                quote! {
                    {
                        let magic: #typ = #val;
                        out.write_type::<E, #typ>(&magic)?;
                    }
                }
            }
            ParsingDirective::Padding { num_bytes } => {
                quote! {
                    out.write_zeros(#num_bytes);
                }
            }
            ParsingDirective::Param { typ, name, encode } => {
                let Some(encode) = encode else {
                    return Err(syn::Error::new(
                        name.span(),
                        "param needs an `encode = <expr>` to be written back",
                    ));
                };
                let label = name.to_string();
                quote! {
                    {
                        let #name = <#typ as ::core::convert::TryFrom<_>>::try_from(#encode)
                            .map_err(|_| ::parsing::Error::ValueOverflow { name: #label })?;
                        out.write_type::<E, #typ>(&#name)?;
                    }
                }
            }
            ParsingDirective::Ignore { typ } => {
                quote! {
                    out.write_type::<E, #typ>(&<#typ as ::core::default::Default>::default())?;
                }
            }
        })
    }
}

struct FieldStruct {
    name: Ident,
    read_type: syn::Type,
    option: Option<Expr>,
    e: FieldEnum,
}

enum FieldEnum {
    Normal,
    SizedBuf(Expr),
    RestOfBuf,
    Collection { field_ty: syn::Type, num_elems: Expr },
}

impl FieldStruct {
    fn from_field(field: &Field) -> syn::Result<Self> {
        let name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "only named fields are supported"))?;
        Ok(Self {
            name,
            read_type: field.ty.clone(),
            option: None,
            e: FieldEnum::Normal,
        })
    }

    fn parse_tokens(&self) -> proc_macro2::TokenStream {
        let read = match &self.e {
            FieldEnum::Normal => {
                let ty = &self.read_type;
                quote! {input.read_type::<E, #ty>()?}
            }
            FieldEnum::SizedBuf(size) => {
                let label = format!("{} length", self.name);
                quote! {
                    {
                        let len: usize = ::core::convert::TryFrom::try_from(#size)
                            .map_err(|_| ::parsing::Error::ValueOverflow { name: #label })?;
                        input.read_bytes(len)?.into()
                    }
                }
            }
            FieldEnum::RestOfBuf => {
                quote! {input.read_rest().into()}
            }
            FieldEnum::Collection {
                field_ty,
                num_elems,
            } => {
                let item_ty = &self.read_type;
                quote! {
                    (0..(#num_elems))
                        .map(|_| input.read_type::<E, #item_ty>())
                        .collect::<::parsing::Result<#field_ty>>()?
                }
            }
        };
        let name = &self.name;
        if let Some(cond) = &self.option {
            quote! {
                let #name = if #cond {
                    Some(#read)
                } else {
                    None
                };
            }
        } else {
            quote! {
                let #name = #read;
            }
        }
    }

    fn encode_tokens(&self) -> proc_macro2::TokenStream {
        let write = |value: proc_macro2::TokenStream| match &self.e {
            FieldEnum::Normal => {
                let ty = &self.read_type;
                quote! {out.write_type::<E, #ty>(#value)?;}
            }
            FieldEnum::SizedBuf(_) | FieldEnum::RestOfBuf => {
                quote! {out.write_bytes(::core::convert::AsRef::<[u8]>::as_ref(#value));}
            }
            FieldEnum::Collection { .. } => {
                let item_ty = &self.read_type;
                quote! {
                    for item in #value {
                        out.write_type::<E, #item_ty>(item)?;
                    }
                }
            }
        };
        let name = &self.name;
        if self.option.is_some() {
            let write = write(quote! {value});
            quote! {
                if let Some(value) = &self.#name {
                    #write
                }
            }
        } else {
            write(quote! {&self.#name})
        }
    }
}

enum FieldOrDirective {
    Field(FieldStruct),
    Directive(ParsingDirective),
}

impl FieldOrDirective {
    fn parse_tokens(&self) -> proc_macro2::TokenStream {
        match self {
            FieldOrDirective::Directive(thing) => thing.parse_tokens(),
            FieldOrDirective::Field(field) => field.parse_tokens(),
        }
    }

    fn encode_tokens(&self) -> syn::Result<proc_macro2::TokenStream> {
        match self {
            FieldOrDirective::Directive(thing) => thing.encode_tokens(),
            FieldOrDirective::Field(field) => Ok(field.encode_tokens()),
        }
    }
}

/// Reads the `#[parse(...)]` attributes of a field and strips them from it.
fn field_struct(field: &mut Field) -> syn::Result<FieldStruct> {
    let mut field_thing = FieldStruct::from_field(field)?;
    let mut err = Ok(());
    let field_ty = field.ty.clone();
    field.attrs.retain(|attr| {
        if !attr.path().is_ident("parse") {
            return true;
        }
        let res = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("sized_buf") {
                meta.input.parse::<Token![=]>()?;
                let size = meta.input.parse::<Expr>()?;
                field_thing.e = FieldEnum::SizedBuf(size);
            } else if meta.path.is_ident("rest_of_buf") {
                field_thing.e = FieldEnum::RestOfBuf;
            } else if meta.path.is_ident("collection") {
                meta.input.parse::<Token![:]>()?;
                let ty = meta.input.parse::<syn::Type>()?;
                meta.input.parse::<Token![=]>()?;
                let num_elems = meta.input.parse::<Expr>()?;
                field_thing.read_type = ty;
                field_thing.e = FieldEnum::Collection {
                    field_ty: field_ty.clone(),
                    num_elems,
                };
            } else if meta.path.is_ident("option_if") {
                meta.input.parse::<Token![:]>()?;
                let ty = meta.input.parse::<syn::Type>()?;
                meta.input.parse::<Token![=]>()?;
                let cond = meta.input.parse::<Expr>()?;
                field_thing.read_type = ty;
                field_thing.option = Some(cond);
            } else {
                return Err(meta.error("unsupported parse attribute"));
            }
            Ok(())
        });
        if let Err(e) = res {
            err = Err(e);
        }
        false
    });
    err?;
    Ok(field_thing)
}

struct ParsedStruct {
    s: syn::ItemStruct,
    things: Vec<FieldOrDirective>,
}

impl Parse for ParsedStruct {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let struct_attrs = input.call(Attribute::parse_outer)?;
        let vis = input.parse::<Visibility>()?;
        let struct_token = input.parse::<Token![struct]>()?;
        let name = input.parse::<Ident>()?;
        let mut generics = input.parse::<Generics>()?;
        if input.peek(Token![where]) {
            generics.where_clause = Some(input.parse::<syn::WhereClause>()?)
        };

        let braced_input;
        let brace_token = braced!(braced_input in input);
        let input = braced_input;

        let mut fields = Punctuated::<Field, Comma>::new();
        let mut parsing_things = Vec::new();

        while !input.is_empty() {
            if input.peek(syn::token::Bracket) {
                let directive = input.parse::<ParsingDirective>()?;
                parsing_things.push(FieldOrDirective::Directive(directive));
                continue;
            }
            let mut field = input.call(Field::parse_named)?;
            let field_thing = field_struct(&mut field)?;
            parsing_things.push(FieldOrDirective::Field(field_thing));
            fields.push_value(field);
            if input.is_empty() {
                break;
            }
            fields.push_punct(input.parse::<Comma>()?);
        }

        let fields = syn::FieldsNamed {
            brace_token,
            named: fields,
        };

        let s = syn::ItemStruct {
            attrs: struct_attrs,
            vis,
            struct_token,
            ident: name,
            generics,
            fields: syn::Fields::Named(fields),
            semi_token: None,
        };

        Ok(Self {
            s,
            things: parsing_things,
        })
    }
}

/// Adds the byte order parameter `E`, and for decoding the input lifetime,
/// which must outlive every lifetime of the type.
fn codec_generics(generics: &Generics, lifetime: Option<&syn::Lifetime>) -> Generics {
    let mut generics_mod = generics.clone();

    if let Some(lifetime) = lifetime {
        generics_mod.params.insert(
            0,
            syn::GenericParam::Lifetime(syn::LifetimeParam::new(lifetime.clone())),
        );

        let mut bounds = Punctuated::new();
        for l in generics.lifetimes() {
            bounds.push(l.lifetime.clone());
        }

        if !bounds.is_empty() {
            generics_mod
                .make_where_clause()
                .predicates
                .push(syn::WherePredicate::Lifetime(syn::PredicateLifetime {
                    lifetime: lifetime.clone(),
                    colon_token: syn::token::Colon::default(),
                    bounds,
                }));
        }
    }

    generics_mod
        .params
        .push(syn::parse_quote!(E: ::parsing::ByteOrder));
    generics_mod
}

fn field_names(struct_def: &syn::ItemStruct) -> syn::Result<Vec<&Ident>> {
    struct_def
        .fields
        .iter()
        .map(|f| {
            f.ident
                .as_ref()
                .ok_or_else(|| syn::Error::new(f.span(), "only named fields are supported"))
        })
        .collect()
}

fn generate_parse_impl(
    things: &[FieldOrDirective],
    struct_def: &syn::ItemStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let parsing = things.iter().map(FieldOrDirective::parse_tokens);
    let struct_name = &struct_def.ident;
    let field_names = field_names(struct_def)?;

    let parse_lifetime = syn::Lifetime::new("'parse", Span::call_site());
    let generics = codec_generics(&struct_def.generics, Some(&parse_lifetime));
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let (_, ty_generics, _) = struct_def.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::parsing::Parse<#parse_lifetime, E>
            for #struct_name #ty_generics #where_clause
        {
            fn parse(
                input: &mut impl ::parsing::ReadBytes<#parse_lifetime>,
            ) -> ::parsing::Result<Self> {
                #(
                    #parsing
                )*
                Ok(Self {
                    #(
                        #field_names
                    ),*
                })
            }
        }
    })
}

fn generate_encode_impl(
    things: &[FieldOrDirective],
    struct_def: &syn::ItemStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let encoding = things
        .iter()
        .map(FieldOrDirective::encode_tokens)
        .collect::<syn::Result<Vec<_>>>()?;
    let struct_name = &struct_def.ident;

    let generics = codec_generics(&struct_def.generics, None);
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let (_, ty_generics, _) = struct_def.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::parsing::Encode<E> for #struct_name #ty_generics #where_clause {
            fn encode(&self, out: &mut impl ::parsing::WriteBytes) -> ::parsing::Result<()> {
                #(
                    #encoding
                )*
                Ok(())
            }
        }
    })
}

fn plain_fields(input: &syn::ItemStruct) -> syn::Result<Vec<FieldOrDirective>> {
    input
        .fields
        .iter()
        .map(|field| FieldStruct::from_field(field).map(FieldOrDirective::Field))
        .collect()
}

/// Generates a struct together with its `Parse` and `Encode` impls.
/// Directives between double brackets describe bytes that have no field.
/// ```ignore
/// parsable_struct! {
///     pub struct FrameHeader {
///         pub byte_len: u32,
///         [[magic: u16 = 0xF1FA]]
///         pub duration_ms: u16,
///         [[padding_bytes = 2]]
///         [[ignore: u32]]
///     }
/// }
/// ```
/// `padding_bytes` are skipped on decode and written as zeros.
/// `ignore` reads a value and drops it, writing `Default::default()` back.
/// `magic` is written as given and the decode fails on any other value.
///
/// `[[param: <int type> = <name>, encode = <expr>]]` reads an int that later
/// fields can refer to, without storing it. Counts and lengths are params.
/// The `encode` expression recomputes it from `self` on write,
/// a value that does not fit `<int type>` fails with `Error::ValueOverflow`.
///
/// Sized buffers
/// ```ignore
/// parsable_struct! {
///     pub struct Profile<'a> {
///         pub kind: u16,
///         [[param: u32 = data_len, encode = self.data.len()]]
///         #[parse(sized_buf = data_len)]
///         data: &'a [u8],
///     }
/// }
/// ```
/// The slice is converted with `.into()`, so any `From<&[u8]> + AsRef<[u8]>`
/// type works, `Vec<u8>` included.
/// `#[parse(rest_of_buf)]` takes whatever is left of the input.
///
/// Optional fields
/// ```ignore
/// parsable_struct! {
///     pub struct Entry {
///         [[param: u16 = flags, encode = u16::from(self.name.is_some())]]
///         #[parse(option_if: String = (flags & 1) != 0)]
///         pub name: Option<String>,
///     }
/// }
/// ```
///
/// Collections
/// ```ignore
/// parsable_struct! {
///     pub struct Packet {
///         pub skip: u8,
///         [[param: u8 = len, encode = self.colors.len()]]
///         #[parse(collection: RGB8 = len)]
///         pub colors: Vec<RGB8>,
///     }
/// }
/// ```
/// Elements are decoded one after another and collected, so any
/// `FromIterator` collection can hold them.
#[proc_macro]
pub fn parsable_struct(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as ParsedStruct);
    let impls = generate_parse_impl(&parsed.things, &parsed.s).and_then(|parse| {
        let encode = generate_encode_impl(&parsed.things, &parsed.s)?;
        Ok(quote! {
            #parse
            #encode
        })
    });
    let impls = match impls {
        Ok(impls) => impls,
        Err(err) => return err.into_compile_error().into(),
    };
    let struct_def = &parsed.s;
    let expanded = quote! {
        #struct_def
        #impls
    };
    TokenStream::from(expanded)
}

/// A simpler version of parsable_struct! that can be derived,
/// every field is read in declaration order.
#[proc_macro_derive(Parse)]
pub fn parse_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::ItemStruct);
    plain_fields(&input)
        .and_then(|things| generate_parse_impl(&things, &input))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Counterpart of `#[derive(Parse)]`.
#[proc_macro_derive(Encode)]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::ItemStruct);
    plain_fields(&input)
        .and_then(|things| generate_encode_impl(&things, &input))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct ParsedEnum {
    repr: Ident,
    e: syn::ItemEnum,
}

/*
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u16)]
pub enum PixelFormat {
    Indexed = 8,
    Grayscale = 16,
    Rgba = 32,
}
*/

impl Parse for ParsedEnum {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let e = input.parse::<syn::ItemEnum>()?;

        let mut repr = None;
        for attr in e.attrs.iter().filter(|attr| attr.path().is_ident("repr")) {
            repr = Some(attr.parse_args::<Ident>()?);
        }
        let Some(repr) = repr else {
            return Err(syn::Error::new(
                e.ident.span(),
                "missing integer representation `#[repr(<int-type>)]`",
            ));
        };

        for var in e.variants.iter() {
            if !matches!(var.fields, syn::Fields::Unit) {
                return Err(syn::Error::new(
                    var.fields.span(),
                    "only unit variants are allowed",
                ));
            }
        }

        Ok(Self { repr, e })
    }
}

/// Generates a fieldless enum read from and written as its `#[repr]` integer.
/// Values without a matching variant fail with `Error::EnumTypeValueMatchFailed`.
#[proc_macro]
pub fn parsable_enum(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as ParsedEnum);

    let enum_def = &parsed.e;
    let enum_name = &enum_def.ident;
    let label = enum_name.to_string();
    let repr = &parsed.repr;
    let enum_idents: Vec<_> = enum_def.variants.iter().map(|var| &var.ident).collect();

    let expanded = quote! {
        #enum_def

        impl<'parse, E: ::parsing::ByteOrder> ::parsing::Parse<'parse, E> for #enum_name {
            fn parse(input: &mut impl ::parsing::ReadBytes<'parse>) -> ::parsing::Result<Self> {
                let value = input.read_type::<E, #repr>()?;
                #(
                    if value == Self::#enum_idents as #repr {
                        return Ok(Self::#enum_idents);
                    }
                )*
                Err(::parsing::Error::EnumTypeValueMatchFailed {
                    name: #label,
                    value: u64::from(value),
                })
            }
        }

        impl<E: ::parsing::ByteOrder> ::parsing::Encode<E> for #enum_name {
            fn encode(&self, out: &mut impl ::parsing::WriteBytes) -> ::parsing::Result<()> {
                let value = match self {
                    #(
                        Self::#enum_idents => Self::#enum_idents as #repr,
                    )*
                };
                out.write_type::<E, #repr>(&value)
            }
        }
    };
    TokenStream::from(expanded)
}
