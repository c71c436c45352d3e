use std::sync::Arc;
use std::time::Duration;

use bounce_audio::{AudioContext, Player};
use bounce_core::input::InputState;
use bounce_core::{AssetRegistry, Bounds, DrawList, Entity, EntityKind, Game, GameConfig};

const PLAYER_START: (f32, f32) = (16.0, 16.0);
const BOUNCER_START: (f32, f32) = (0.0, 0.0);
const BOUNCER_SPEED: (f32, f32) = (2.0, 1.0);

/// The demo: a steerable ship and an optional constant-speed bouncer, each
/// playing the bounce sound whenever it hits a viewport edge.
pub struct BounceGame {
    width: u32,
    height: u32,
    assets: Arc<AssetRegistry>,
    audio: AudioContext,
    players: Vec<Player>,
    entities: Vec<Entity>,
    bounce_sound: String,
    tick: Duration,
}

impl BounceGame {
    pub fn new(
        config: &GameConfig,
        assets: Arc<AssetRegistry>,
        audio: AudioContext,
    ) -> Result<Self, String> {
        let mut entities = vec![Entity::new(
            EntityKind::Player,
            PLAYER_START,
            (0.0, 0.0),
            &config.player_sprite,
            &assets,
        )?];
        if let Some(sprite) = &config.bouncer_sprite {
            entities.push(Entity::new(
                EntityKind::Bouncer,
                BOUNCER_START,
                BOUNCER_SPEED,
                sprite,
                &assets,
            )?);
        }
        if assets.sound(&config.bounce_sound).is_none() {
            log::warn!(
                "Bounce sound '{}' is not loaded; bounces will be silent",
                config.bounce_sound
            );
        }

        Ok(Self {
            width: config.width,
            height: config.height,
            assets,
            audio,
            players: Vec::new(),
            entities,
            bounce_sound: config.bounce_sound.clone(),
            tick: Duration::from_secs_f64(1.0 / f64::from(config.tick_rate.max(1))),
        })
    }

    /// Starts a new voice for `name`. Unknown names are logged and ignored.
    pub fn play_sound(&mut self, name: &str) {
        let Some(stream) = self.assets.sound_stream(name) else {
            log::warn!("No such sound: {name}");
            return;
        };
        match self.audio.new_player(stream) {
            Ok(player) => {
                player.play();
                self.players.push(player);
            }
            Err(err) => log::warn!("Could not play {name}: {err}"),
        }
    }

    /// Closes every player that has stopped.
    pub fn purge_audio(&mut self) {
        self.players.retain(|player| {
            let playing = player.is_playing();
            if !playing {
                player.close();
            }
            playing
        });
    }

    pub fn active_sounds(&self) -> usize {
        self.players.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn audio(&self) -> &AudioContext {
        &self.audio
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            width: self.width as f32,
            height: self.height as f32,
        }
    }
}

impl Game for BounceGame {
    fn update(&mut self, input: &InputState) -> Result<(), String> {
        self.audio.advance(self.tick);
        self.purge_audio();

        let steer = input.steer();
        let bounds = self.bounds();
        let bounces: usize = self
            .entities
            .iter_mut()
            .map(|entity| entity.behave(steer, bounds).count())
            .sum();

        for _ in 0..bounces {
            let sound = self.bounce_sound.clone();
            self.play_sound(&sound);
        }
        Ok(())
    }

    fn draw(&self, list: &mut DrawList) {
        for entity in &self.entities {
            list.draw_sprite(&entity.sprite, entity.x, entity.y);
        }
    }

    fn layout(&self, _outside_width: u32, _outside_height: u32) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounce_core::input::Key;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct Fixture {
        root: PathBuf,
        config: GameConfig,
        assets: Arc<AssetRegistry>,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    /// Two 8x8 sprites and a two-frame bounce sound on disk.
    fn fixture(name_hint: &str) -> Fixture {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "bounce_game_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        let sprites = root.join("sprites");
        let sounds = root.join("sounds");
        fs::create_dir_all(&sprites).expect("create sprites dir");
        fs::create_dir_all(&sounds).expect("create sounds dir");

        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 255, 0, 255]));
        for name in ["ship.png", "powerup.png"] {
            img.save_with_format(sprites.join(name), image::ImageFormat::Png)
                .expect("write png fixture");
        }
        let mut wav = vec![0u8; 44];
        for sample in [1000i16, 1000, -1000, -1000] {
            wav.extend_from_slice(&sample.to_le_bytes());
        }
        fs::write(sounds.join("test.wav"), wav).expect("write wav fixture");

        let config = GameConfig {
            sprites_dir: sprites,
            sounds_dir: sounds,
            ..GameConfig::default()
        };
        let (assets, report) =
            AssetRegistry::load(&config.sprites_dir, &config.sounds_dir).expect("load fixture");
        assert!(report.is_complete());
        Fixture {
            root,
            config,
            assets: Arc::new(assets),
        }
    }

    fn game(fx: &Fixture) -> BounceGame {
        BounceGame::new(&fx.config, Arc::clone(&fx.assets), AudioContext::headless(44_100))
            .expect("game builds")
    }

    #[test]
    fn missing_player_sprite_fails_construction() {
        let fx = fixture("missing_sprite");
        let config = GameConfig {
            player_sprite: "nope.png".to_string(),
            ..fx.config.clone()
        };
        let result = BounceGame::new(&config, Arc::clone(&fx.assets), AudioContext::headless(44_100));
        assert!(result.is_err());
    }

    #[test]
    fn bouncer_is_optional() {
        let fx = fixture("optional");
        assert_eq!(game(&fx).entities().len(), 2);

        let config = GameConfig {
            bouncer_sprite: None,
            ..fx.config.clone()
        };
        let solo = BounceGame::new(&config, Arc::clone(&fx.assets), AudioContext::headless(44_100))
            .expect("game builds");
        assert_eq!(solo.entities().len(), 1);
        assert_eq!(solo.entities()[0].kind, EntityKind::Player);
    }

    #[test]
    fn edge_hits_play_one_sound_per_bounce() {
        let fx = fixture("bounce");
        let mut game = game(&fx);
        let input = InputState::new();

        game.update(&input).unwrap();
        assert_eq!(game.active_sounds(), 0);

        // Player heading off the left and top edges at once.
        game.entities[0].x = -1.0;
        game.entities[0].y = -1.0;
        game.update(&input).unwrap();
        assert_eq!(game.active_sounds(), 2);
        assert_eq!(game.audio().mixer().lock().unwrap().voice_count(), 2);
    }

    #[test]
    fn finished_sounds_are_purged_on_update() {
        let fx = fixture("purge");
        let mut game = game(&fx);
        game.play_sound("test.wav");
        assert_eq!(game.active_sounds(), 1);

        {
            let mixer = game.audio().mixer();
            let mut mixer = mixer.lock().unwrap();
            let first = mixer.next_frame();
            assert!(first.left > 0.0);
            for _ in 0..4 {
                mixer.next_frame();
            }
        }

        game.update(&InputState::new()).unwrap();
        assert_eq!(game.active_sounds(), 0);
        let mixer = game.audio().mixer();
        let mut mixer = mixer.lock().unwrap();
        mixer.drop_closed();
        assert_eq!(mixer.voice_count(), 0);
    }

    #[test]
    fn headless_sounds_finish_and_never_pile_up() {
        let fx = fixture("headless_bounded");
        let mut game = game(&fx);
        let input = InputState::new();
        let mut most_active = 0;
        for _ in 0..5_000 {
            game.update(&input).unwrap();
            most_active = most_active.max(game.active_sounds());
        }
        // The bouncer crosses the 600x400 screen many times in 5000 ticks.
        assert!(most_active >= 1);
        assert!(most_active <= 2);
        assert!(game.audio().mixer().lock().unwrap().voice_count() <= 4);
    }

    #[test]
    fn shipped_demo_config_and_assets_load() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = bounce_core::config::load_config_from_path(&root.join("assets/bounce.json"))
            .expect("shipped config is valid");
        let (assets, report) = AssetRegistry::load(
            &root.join(&config.sprites_dir),
            &root.join(&config.sounds_dir),
        )
        .expect("shipped asset directories exist");
        assert!(report.is_complete());
        assert!(assets.sound(&config.bounce_sound).is_some());

        let game = BounceGame::new(&config, Arc::new(assets), AudioContext::headless(config.sample_rate))
            .expect("demo starts from shipped assets");
        assert_eq!(game.entities().len(), 2);
    }

    #[test]
    fn unknown_sound_is_ignored() {
        let fx = fixture("unknown_sound");
        let mut game = game(&fx);
        game.play_sound("nope.wav");
        assert_eq!(game.active_sounds(), 0);
    }

    #[test]
    fn steering_keys_accelerate_the_player_only() {
        let fx = fixture("steer");
        let mut game = game(&fx);
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.key_down(Key::S);
        game.update(&input).unwrap();
        let player = &game.entities()[0];
        assert!((player.speed_x - 0.1).abs() < 1e-6);
        assert!((player.speed_y - 0.1).abs() < 1e-6);
        assert_eq!(game.entities()[1].speed_x, BOUNCER_SPEED.0);
    }

    #[test]
    fn draw_places_every_entity_and_layout_is_fixed() {
        let fx = fixture("draw");
        let game = game(&fx);
        let mut list = DrawList::default();
        game.draw(&mut list);
        assert_eq!(list.len(), 2);
        assert_eq!(list.sprites[0].sprite, "ship.png");
        assert_eq!(
            (list.sprites[0].center_x, list.sprites[0].center_y),
            PLAYER_START
        );
        assert_eq!(list.sprites[1].sprite, "powerup.png");
        assert_eq!(game.layout(1920, 1080), (600, 400));
    }
}
