//! Testing utilities for the storyline workspace
//!
//! Shared scenario fixtures and model helpers.

#![allow(missing_docs)]

use storyline_model::{Bindings, DomainModel};
use storyline_scenario::{Scenario, Step, StepArgument, StepRole};

pub fn given(keyword: &str) -> Step {
    Step::new(keyword, StepRole::Given)
}

pub fn when(keyword: &str) -> Step {
    Step::new(keyword, StepRole::When)
}

pub fn then(keyword: &str) -> Step {
    Step::new(keyword, StepRole::Then)
}

/// Scenario with a single `when` step and no model info
pub fn plain_scenario(name: &str) -> Scenario {
    Scenario::new(name, format!("{}.robot", name.to_lowercase())).with_step(when(&format!("When {name}")))
}

pub fn model_from(statements: &[&str]) -> DomainModel {
    let mut model = DomainModel::new();
    for statement in statements {
        model.evaluate_str(statement, &Bindings::new()).unwrap();
    }
    model
}

/// Opening the shop; everything else needs it
pub fn open_shop() -> Scenario {
    Scenario::new("Open shop", "shop.robot:1").with_step(
        when("When the shop opens")
            .with_out("new shop")
            .with_out("shop.open = True")
            .with_out("shop.stock = ['apple', 'pear', 'plum']")
            .with_out("new basket")
            .with_out("basket.items = []")
            .with_out("basket.paid = False"),
    )
}

/// Buying one fruit from the stock
pub fn buy_fruit() -> Scenario {
    Scenario::new("Buy fruit", "shop.robot:10")
        .with_step(given("Given the shop is open").with_in("shop.open == True"))
        .with_step(
            when("When the customer picks apple")
                .with_arg(StepArgument::scalar("fruit", "apple"))
                .with_mod("${fruit} = shop.stock")
                .with_in("basket.paid == False")
                .with_out("basket.items += ${fruit}"),
        )
        .with_step(
            then("Then apple is in the basket")
                .with_arg(StepArgument::scalar("fruit", "apple"))
                .with_out("${fruit} in basket.items"),
        )
}

/// Leaving with a paid basket; needs payment to have happened
pub fn leave_shop() -> Scenario {
    Scenario::new("Leave shop", "shop.robot:20")
        .with_step(given("Given items in the basket").with_in("len(basket.items) > 0"))
        .with_step(when("When the customer leaves").with_out("basket.paid == True"))
        .with_step(then("Then the basket goes along").with_out("basket.items"))
}

/// Paying for a filled basket
pub fn pay() -> Scenario {
    Scenario::new("Pay", "shop.robot:30")
        .with_step(given("Given an unpaid basket").with_in("basket.paid == False"))
        .with_step(
            when("When the customer pays")
                .with_in("len(basket.items) > 0")
                .with_out("basket.paid = True"),
        )
        .with_step(then("Then the basket is paid").with_out("basket.paid == True"))
}

/// Pool where `Leave shop` only fits through refinement around `Pay`
pub fn shop_pool() -> Vec<Scenario> {
    vec![open_shop(), buy_fruit(), leave_shop(), pay()]
}
