//! Ownership of every projectile in play.

use crate::config::World;
use crate::entities::{Bullet, EnemyBullet, Entity};

/// Where newly fired shots go.  The player and shooter enemies fire into a
/// sink instead of holding a reference to the manager.
pub trait BulletSink {
    fn fire_from_player(&mut self, x: f32, y: f32);
    fn fire_from_enemy(&mut self, x: f32, y: f32);
}

#[derive(Clone, Debug, Default)]
pub struct BulletManager {
    bullets: Vec<Bullet>,
    enemy_bullets: Vec<EnemyBullet>,
}

impl BulletManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every bullet, then drop the ones that left the screen.
    pub fn step(&mut self, world: &World) {
        for bullet in &mut self.bullets {
            bullet.update();
        }
        for bullet in &mut self.enemy_bullets {
            bullet.update(world);
        }
        self.purge_inactive();
    }

    /// Drop bullets deactivated by movement or by a collision this tick.
    pub fn purge_inactive(&mut self) {
        self.bullets.retain(|b| b.is_active());
        self.enemy_bullets.retain(|b| b.is_active());
    }

    pub fn active_bullets(&self) -> impl Iterator<Item = &Bullet> + '_ {
        self.bullets.iter().filter(|b| b.is_active())
    }

    pub fn active_enemy_bullets(&self) -> impl Iterator<Item = &EnemyBullet> + '_ {
        self.enemy_bullets.iter().filter(|b| b.is_active())
    }

    pub(crate) fn active_bullets_mut(&mut self) -> impl Iterator<Item = &mut Bullet> + '_ {
        self.bullets.iter_mut().filter(|b| b.is_active())
    }

    pub(crate) fn active_enemy_bullets_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut EnemyBullet> + '_ {
        self.enemy_bullets.iter_mut().filter(|b| b.is_active())
    }

    /// Total bullets held, including any deactivated since the last purge.
    pub fn len(&self) -> usize {
        self.bullets.len() + self.enemy_bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.bullets.clear();
        self.enemy_bullets.clear();
    }
}

impl BulletSink for BulletManager {
    fn fire_from_player(&mut self, x: f32, y: f32) {
        self.bullets.push(Bullet::new(x, y));
    }

    fn fire_from_enemy(&mut self, x: f32, y: f32) {
        self.enemy_bullets.push(EnemyBullet::new(x, y));
    }
}
