use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, Ident, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Run an async endpoint test against its own throwaway database.
///
/// Before the test, `crate::rocket_for_db` builds the full application on a
/// database named by `crate::database()`, so the collection indexes exist and
/// the routes see the same `Database` the test does. The database is dropped
/// once the test returns or panics, and a panic is then re-raised.
///
/// Parameters are injected by type: a [`rocket::local::asynchronous::Client`]
/// for the application, the [`mongodb::Database`] itself, and any number of
/// `Coll<T>` handles. `Client` and `Database` come first.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = TokenStream2::from(args);
        return syn::Error::new(args.span(), "`backend_test` takes no arguments")
            .into_compile_error()
            .into();
    }
    let mut item_fn = parse_macro_input!(input as ItemFn);

    let (test_args, collection_idents, collection_types) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // The generated `#[test]` takes the original name; the body keeps a suffixed one.
    let name = item_fn.sig.ident.clone();
    let body_name = format_ident!("{}_body", name);
    item_fn.sig.ident = body_name.clone();

    quote! {
        #[test]
        fn #name() {
            fn runtime(thread_name: &str) -> rocket::tokio::runtime::Runtime {
                rocket::tokio::runtime::Builder::new_multi_thread()
                    .thread_name(thread_name)
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .unwrap()
            }

            async fn open_test_database() -> (rocket::local::asynchronous::Client, mongodb::Database) {
                let db_client = crate::db_client().await;
                let db_name = crate::database();
                let app = crate::rocket_for_db(db_client.clone(), &db_name).await;
                let rocket_client = rocket::local::asynchronous::Client::tracked(app)
                    .await
                    .unwrap();
                (rocket_client, db_client.database(&db_name))
            }

            #item_fn

            // The body's runtime is consumed inside `catch_unwind`, so the
            // database is opened and dropped on a separate one.
            let housekeeping = runtime("voteapp-test-db");
            let (rocket_client, db) = housekeeping.block_on(open_test_database());

            // `catch_unwind` needs `UnwindSafe` captures; moving through a
            // mutex provides that.
            let moved = std::sync::Mutex::new((rocket_client, db.clone()));
            let outcome = std::panic::catch_unwind(|| {
                let (rocket_client, db) = moved.into_inner().unwrap();
                #(
                    let #collection_idents = crate::model::mongodb::Coll::<#collection_types>::from_db(&db);
                )*
                runtime("voteapp-test-body")
                    .block_on(#body_name(#(#test_args),* #(,#collection_idents)*));
            });

            housekeeping.block_on(async move { db.drop(None).await.unwrap() });

            if let Err(cause) = outcome {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
#[allow(clippy::type_complexity)]
fn check_sig(sig: Signature) -> Result<(Vec<TokenStream2>, Vec<Ident>, Vec<Ident>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_db = false;
    let mut args = vec![];
    let mut collection_idents = vec![];
    let mut collection_types = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "Database" {
                            if has_db {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `mongodb::Database`",
                                ));
                            }
                            has_db = true;
                            args.push(quote! { db });
                            continue;
                        }
                    } else {
                        // A path always has at least one segment.
                        let possible_collection = type_path.path.segments.last().unwrap();
                        if possible_collection.ident == "Coll" {
                            if let PathArguments::AngleBracketed(generics) =
                                &possible_collection.arguments
                            {
                                if let Some(GenericArgument::Type(Type::Path(type_path))) =
                                    generics.args.first()
                                {
                                    if let Some(type_ident) = type_path.path.get_ident() {
                                        collection_idents.push(pat_ident.ident.clone());
                                        collection_types.push(type_ident.clone());
                                        continue;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `db_ident: Database` or `collection_ident: Coll<T>`",
        ));
    }

    Ok((args, collection_idents, collection_types))
}
