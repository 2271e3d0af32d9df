use super::*;

/// Maximum number of parameters in a function declaration.
const MAX_PARAMS: usize = 255;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement).
    /// On a syntax error, the parser skips to the next statement boundary and returns [`Stmt::Error`].
    pub fn parse_declaration(&mut self) -> Stmt {
        let result = match self.peek().kind {
            TokenKind::Var => self.parse_var_declaration(),
            TokenKind::Fun => self.parse_fn_declaration(),
            _ => self.parse_stmt(),
        };

        match result {
            Ok(stmt) => stmt,
            Err(_) => {
                self.synchronize();
                Stmt::Error
            }
        }
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => self.parse_print_stmt(),
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.parse_block()?))
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            _ => {
                // expression statement
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// Parses the declarations of a block up to and including the closing `}`.
    /// The opening `{` has already been eaten.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_declaration());
        }
        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;

        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        self.advance(); // var
        let name = self.expect(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.eat(TokenKind::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn parse_fn_declaration(&mut self) -> ParseResult<Stmt> {
        self.advance(); // fun
        let name = self.expect(TokenKind::Identifier, "Expect function name.")?;

        self.expect(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_PARAMS {
                    // reported but not fatal, keep parsing
                    self.error(self.peek(), "Can't have more than 255 parameters.");
                }
                params.push(self.expect(TokenKind::Identifier, "Expect parameter name.")?);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "Expect ')' after parameters.")?;

        self.expect(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.parse_block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn parse_print_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;

        Ok(Stmt::Print { keyword, value })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.advance(); // if
        self.expect(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.advance(); // while
        self.expect(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::While { condition, body })
    }

    /// Parses a `for` loop and desugars it into a block wrapping a `while` loop:
    /// `{ initializer; while (condition) { body; increment; } }`.
    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.advance(); // for
        self.expect(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => Some(self.parse_var_declaration()?),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Some(Stmt::Expression(expr))
            }
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Literal::Bool(true))
        } else {
            self.parse_expr()?
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.parse_stmt()?;
        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let mut desugared = Vec::with_capacity(2);
        desugared.extend(initializer);
        desugared.push(Stmt::While {
            condition,
            body: Box::new(body),
        });
        Ok(Stmt::Block(desugared))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let value = if self.check(TokenKind::Semicolon) || self.is_at_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }
}
