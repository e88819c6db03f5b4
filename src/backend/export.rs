//! Entry-point export for backend modules.

/// Exports a [`BackendContract`](crate::backend::ports::BackendContract)
/// implementation as a loadable backend module.
///
/// Emits the six `#[unsafe(no_mangle)]` entry-point statics the dynamic
/// loader resolves (`Connect`, `NewClientManager`, `NewGroupManager`,
/// `NewJWKManager`, `NewOAuth2Manager`, `NewPolicyManager`), each tagged with
/// the current ABI version and its signature. Invoke it once, at the root of
/// a `cdylib` crate.
///
/// The backend expression is evaluated on every call, so it should be a
/// unit struct or a cheap constructor.
///
/// ```ignore
/// pub struct OracleBackend;
///
/// impl authstore::backend::ports::BackendContract for OracleBackend {
///     // ...
/// }
///
/// authstore::export_backend_module!(OracleBackend);
/// ```
#[macro_export]
macro_rules! export_backend_module {
    (@entry $symbol:ident, $marker:ident, $fn_ty:ident, $function:ident) => {
        #[doc = concat!("Backend module entry point `", stringify!($symbol), "`.")]
        #[unsafe(no_mangle)]
        pub static $symbol: $crate::backend::ports::EntryPoint =
            $crate::backend::ports::EntryPoint::erased(
                <$crate::backend::ports::$marker as $crate::backend::ports::EntrySignature>::SIGNATURE,
                $function as $crate::backend::ports::$fn_ty as *const (),
            );
    };
    ($backend:expr) => {
        fn __authstore_connect(
            url: &str,
        ) -> $crate::backend::ports::BackendResult<$crate::backend::ports::ConnectionHandle> {
            $crate::backend::ports::BackendContract::connect(&$backend, url)
        }

        fn __authstore_new_client_manager(
            connection: $crate::backend::ports::ConnectionHandle,
            hasher: ::std::sync::Arc<dyn $crate::backend::ports::Hasher>,
        ) -> ::std::sync::Arc<dyn $crate::backend::ports::ClientManager> {
            $crate::backend::ports::BackendContract::new_client_manager(&$backend, connection, hasher)
        }

        fn __authstore_new_group_manager(
            connection: $crate::backend::ports::ConnectionHandle,
        ) -> ::std::sync::Arc<dyn $crate::backend::ports::GroupManager> {
            $crate::backend::ports::BackendContract::new_group_manager(&$backend, connection)
        }

        fn __authstore_new_jwk_manager(
            connection: $crate::backend::ports::ConnectionHandle,
            key_material: $crate::backend::domain::KeyMaterial,
        ) -> ::std::sync::Arc<dyn $crate::backend::ports::JwkManager> {
            $crate::backend::ports::BackendContract::new_jwk_manager(
                &$backend,
                connection,
                key_material,
            )
        }

        fn __authstore_new_oauth2_manager(
            connection: $crate::backend::ports::ConnectionHandle,
            client_manager: ::std::sync::Arc<dyn $crate::backend::ports::ClientManager>,
            logger: $crate::__private::tracing::Span,
        ) -> ::std::sync::Arc<dyn $crate::backend::ports::OAuth2Storer> {
            $crate::backend::ports::BackendContract::new_oauth2_manager(
                &$backend,
                connection,
                client_manager,
                logger,
            )
        }

        fn __authstore_new_policy_manager(
            connection: $crate::backend::ports::ConnectionHandle,
        ) -> ::std::sync::Arc<dyn $crate::backend::ports::PolicyManager> {
            $crate::backend::ports::BackendContract::new_policy_manager(&$backend, connection)
        }

        $crate::export_backend_module!(@entry Connect, ConnectEntry, ConnectFn, __authstore_connect);
        $crate::export_backend_module!(
            @entry NewClientManager,
            NewClientManagerEntry,
            NewClientManagerFn,
            __authstore_new_client_manager
        );
        $crate::export_backend_module!(
            @entry NewGroupManager,
            NewGroupManagerEntry,
            NewGroupManagerFn,
            __authstore_new_group_manager
        );
        $crate::export_backend_module!(
            @entry NewJWKManager,
            NewJwkManagerEntry,
            NewJwkManagerFn,
            __authstore_new_jwk_manager
        );
        $crate::export_backend_module!(
            @entry NewOAuth2Manager,
            NewOAuth2ManagerEntry,
            NewOAuth2ManagerFn,
            __authstore_new_oauth2_manager
        );
        $crate::export_backend_module!(
            @entry NewPolicyManager,
            NewPolicyManagerEntry,
            NewPolicyManagerFn,
            __authstore_new_policy_manager
        );
    };
}
