/// Run/level lifecycle as a single state machine.
///
/// `Playing` steps the current level every frame.  A completed even level
/// opens the `Shop`; any other completion goes straight to the next level.
/// Death leads to `GameOver`, where the player may restart a fresh run or
/// quit.  The front end only forwards input and draws whatever screen is
/// current.

use rand::Rng;
use tracing::info;

use crate::compute::{tick, InputFrame};
use crate::config::GameConfig;
use crate::entities::PlayerUpgrades;
use crate::error::PurchaseError;
use crate::level::{LevelState, LevelStatus};
use crate::shop::{self, ShopItem, ShopOffer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Playing,
    Shop,
    GameOver,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverChoice {
    Restart,
    Quit,
}

#[derive(Clone, Debug)]
pub struct Run {
    pub config: GameConfig,
    /// 1-based level counter.
    pub level: u32,
    pub upgrades: PlayerUpgrades,
    pub screen: Screen,
    /// The level being played, or the one just finished while in the shop
    /// or on the game-over screen.
    pub current: LevelState,
}

impl Run {
    /// Fresh run starting at level 1.
    pub fn new(config: GameConfig, now: u64, rng: &mut impl Rng) -> Self {
        let upgrades = PlayerUpgrades::default();
        let current = LevelState::generate(1, &upgrades, &config, now, rng);
        info!("new run");
        Run {
            config,
            level: 1,
            upgrades,
            screen: Screen::Playing,
            current,
        }
    }

    fn start_level(&mut self, now: u64, rng: &mut impl Rng) {
        self.current = LevelState::generate(self.level, &self.upgrades, &self.config, now, rng);
        self.screen = Screen::Playing;
    }

    fn advance(&mut self, now: u64, rng: &mut impl Rng) {
        self.level += 1;
        self.start_level(now, rng);
    }

    /// Step the active level.  Ignored outside `Playing`.
    pub fn frame(&mut self, input: &InputFrame, now: u64, rng: &mut impl Rng) -> Screen {
        if self.screen != Screen::Playing {
            return self.screen;
        }
        match tick(&mut self.current, input, now, rng) {
            LevelStatus::Running => {}
            LevelStatus::Dead => {
                info!(level = self.level, "player died");
                self.screen = Screen::GameOver;
            }
            LevelStatus::Complete => {
                info!(level = self.level, coins = self.current.player.coins, "level complete");
                if self.level % 2 == 0 {
                    self.screen = Screen::Shop;
                } else {
                    self.advance(now, rng);
                }
            }
        }
        self.screen
    }

    pub fn shop_offers(&self) -> Vec<ShopOffer> {
        shop::offers(&self.upgrades, self.current.player.coins, &self.config.shop)
    }

    pub fn buy(&mut self, item: ShopItem) -> Result<u32, PurchaseError> {
        shop::purchase(
            item,
            &mut self.upgrades,
            &mut self.current.player,
            &self.config.shop,
        )
    }

    /// Close the shop and generate the next level.
    pub fn leave_shop(&mut self, now: u64, rng: &mut impl Rng) {
        if self.screen == Screen::Shop {
            self.advance(now, rng);
        }
    }

    pub fn game_over(&mut self, choice: GameOverChoice, now: u64, rng: &mut impl Rng) {
        if self.screen != Screen::GameOver {
            return;
        }
        match choice {
            GameOverChoice::Restart => {
                info!(reached = self.level, "restarting run");
                self.level = 1;
                self.upgrades = PlayerUpgrades::default();
                self.start_level(now, rng);
            }
            GameOverChoice::Quit => self.quit(),
        }
    }

    /// External quit signal; honoured from any screen.
    pub fn quit(&mut self) {
        self.screen = Screen::Quit;
    }

    pub fn level_reached(&self) -> u32 {
        self.level
    }
}
