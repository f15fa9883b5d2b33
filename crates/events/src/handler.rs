/// Execute an aggregate command: decide, then apply every resulting event.
///
/// If `handle` fails nothing is applied, so a command either takes full
/// effect or none.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: cashguard_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
