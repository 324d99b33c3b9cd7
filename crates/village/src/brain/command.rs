use bt::{action, condition, sequence, Node, Status};

use crate::adapters::Locomotion;

/// Player-driven villager: walk to the latest move command, unless busy harvesting.
///
/// Fails while there is no command; the runner simply retries next frame.
pub fn command_follow_tree<W>() -> Node<W>
where
    W: Locomotion + 'static,
{
    sequence(vec![
        condition(|_ctx, agent, world: &W, _bb| !world.is_harvesting(agent)).labeled("not_harvesting"),
        action(|_ctx, agent, world: &mut W, _bb| match world.move_command() {
            Some(point) => {
                world.set_target(agent, point);
                Status::Success
            }
            None => Status::Failure,
        })
        .labeled("follow_command"),
    ])
    .labeled("villager_command")
}
