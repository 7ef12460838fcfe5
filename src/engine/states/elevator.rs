use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::GameResult;

pub fn on_enter_elevator_event(ctx: &mut Context) -> GameResult<()> {
    ctx.add_response(format!(
        "You found an elevator. You are currently on {}F. Do you want to go to the next floor?",
        ctx.floor + 1
    ));
    Ok(())
}

pub fn on_enter_go_up(ctx: &mut Context) -> GameResult<()> {
    ctx.floor += 1;
    ctx.generate_admin_action(commands::ENTERED_NEXT_FLOOR, Vec::new())
}

pub fn on_enter_elevator_omitted(ctx: &mut Context) -> GameResult<()> {
    ctx.add_response("You decide against the elevator and stay on this floor.");
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_next_floor(ctx: &mut Context) -> GameResult<()> {
    let floor = ctx.floor;
    ctx.add_response(format!("You entered {}F.", floor + 1));
    if floor < ctx.game_config.highest_floor() {
        ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
    } else {
        ctx.add_response("You have conquered the Tower! Congratulations!");
        ctx.generate_admin_action(commands::RESTART, Vec::new())
    }
}
