//! Reusable mock entrypoints for unit testing contracts that invoke
//! collaborator contracts. Compiled for host targets only.
use concordium_std::test_infrastructure::MockFn;
use concordium_std::*;

/// Mock entrypoint that parses the parameter and responds with a fixed
/// return value. Traps if the parameter does not deserialize as `D`.
pub fn parse_and_ok_mock<D: Deserial, S>(
    return_value: impl Clone + Serial + 'static,
) -> MockFn<S> {
    MockFn::new(move |parameter, _amount, _balance, _state| {
        D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
        Ok((false, Some(return_value.clone())))
    })
}

/// Mock entrypoint that parses the parameter and responds with a fixed
/// return value only if the parameter passes the check. Traps otherwise.
pub fn parse_and_check_mock<D: Deserial, S>(
    check: impl Fn(&D) -> bool + 'static,
    return_value: impl Clone + Serial + 'static,
) -> MockFn<S> {
    MockFn::new(move |parameter, _amount, _balance, _state| {
        let value =
            D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
        if !check(&value) {
            return Err(CallContractError::Trap);
        }
        Ok((false, Some(return_value.clone())))
    })
}

/// Mock entrypoint that rejects every call. Used to model a collaborator
/// failure, for example a revoked operator approval.
pub fn reject_mock<S>() -> MockFn<S> {
    MockFn::new(|_parameter, _amount, _balance, _state: &mut _| {
        Err::<(bool, Option<()>), _>(CallContractError::Trap)
    })
}
