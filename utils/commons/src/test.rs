#[cfg(any(test, feature = "wasm-test"))]
pub use inner::*;

/// Entrypoint mocks for collections invoked through `HostCis2Ext`.
///
/// Dependent crates enable the `wasm-test` feature of this crate to use them in their tests.
#[cfg(any(test, feature = "wasm-test"))]
mod inner {
    use concordium_std::test_infrastructure::MockFn;
    use concordium_std::*;

    fn parse<D: Deserial>(parameter: Parameter) -> Result<D, CallContractError<()>> {
        D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)
    }

    /// Answers every well-formed `D` with the same value.
    pub fn parse_and_ok_mock<D: Deserial, S>(
        return_value: impl Clone + Serial + 'static,
    ) -> MockFn<S> {
        MockFn::new(move |parameter, _amount, _balance, _state| {
            D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
            Ok((false, Some(return_value.clone())))
        })
    }

    /// Answers with `f` of the parsed parameter. `None` traps.
    pub fn parse_and_map_mock<D: Deserial, T: Serial, S>(
        f: impl Fn(&D) -> Option<T> + 'static,
    ) -> MockFn<S> {
        MockFn::new(move |parameter, _, _, _state| {
            let value =
                D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
            f(&value)
                .map(|r| (false, Some(r)))
                .ok_or(CallContractError::Trap)
        })
    }

    /// Traps unless `check` accepts the parsed parameter together with the caller state as it
    /// is at the moment of the call.
    pub fn parse_and_inspect_mock<D: Deserial, S>(
        check: impl Fn(&D, &S) -> bool + 'static,
    ) -> MockFn<S> {
        MockFn::new(move |parameter, _, _, state: &mut S| {
            let value: D = parse(parameter)?;
            if check(&value, state) {
                Ok((false, None::<()>))
            } else {
                Err(CallContractError::Trap)
            }
        })
    }

    /// The invoked contract traps on any input.
    pub fn trap_mock<S>() -> MockFn<S> {
        MockFn::new(|_, _, _, _| Err::<(bool, Option<()>), _>(CallContractError::Trap))
    }

    /// The invoked contract has no such entrypoint.
    pub fn missing_entrypoint_mock<S>() -> MockFn<S> {
        MockFn::new(|_, _, _, _| {
            Err::<(bool, Option<()>), _>(CallContractError::MissingEntrypoint)
        })
    }
}
