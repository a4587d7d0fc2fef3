// types.rs — Print an operation's lifecycle identifiers.

use action_thunk::ActionTypes;

pub fn execute(name: &str) -> anyhow::Result<()> {
    for id in &ActionTypes::new(name)? {
        println!("{}", id);
    }
    Ok(())
}
